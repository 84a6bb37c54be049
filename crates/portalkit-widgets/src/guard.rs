#![forbid(unsafe_code)]

//! Close guards shared by every overlay kind.
//!
//! A guard is consulted by a guarded close and can veto it. `Ok(false)`
//! denies quietly; `Err(_)` denies and is logged at warn. Forced closes never
//! consult it.

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

/// Error raised by a close guard.
#[derive(Debug)]
pub struct GuardError {
    message: String,
    source: Option<Box<dyn Error + 'static>>,
}

impl GuardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Error + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "close guard failed: {}", self.message)
    }
}

impl Error for GuardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref()
    }
}

/// Decides whether an overlay may close. `Ok(false)` and `Err(_)` both deny.
pub type CloseGuard = Rc<dyn Fn() -> Result<bool, GuardError>>;

/// The guard slot held by an overlay handle.
#[derive(Default)]
pub(crate) struct GuardSlot {
    guard: RefCell<Option<CloseGuard>>,
}

impl GuardSlot {
    pub(crate) fn new(guard: Option<CloseGuard>) -> Self {
        Self {
            guard: RefCell::new(guard),
        }
    }

    pub(crate) fn set(&self, guard: CloseGuard) {
        *self.guard.borrow_mut() = Some(guard);
    }

    pub(crate) fn clear(&self) {
        self.guard.borrow_mut().take();
    }

    /// Run the guard for the overlay `id`. No guard allows.
    pub(crate) fn allows(&self, id: &str) -> bool {
        // Clone out so the guard may replace itself while running.
        let guard = self.guard.borrow().clone();
        let Some(guard) = guard else {
            return true;
        };
        match guard() {
            Ok(true) => true,
            Ok(false) => {
                tracing::debug!(overlay = id, "close denied by guard");
                false
            }
            Err(err) => {
                tracing::warn!(overlay = id, error = %err, "close guard failed; close denied");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug)]
    struct Io;

    impl fmt::Display for Io {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("storage unavailable")
        }
    }

    impl Error for Io {}

    #[test]
    fn guard_error_keeps_source() {
        let err = GuardError::new("could not save draft").with_source(Io);
        assert_eq!(err.to_string(), "close guard failed: could not save draft");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("storage unavailable")
        );
        assert!(GuardError::new("x").source().is_none());
    }

    #[test]
    fn slot_allows_until_a_guard_denies() {
        let slot = GuardSlot::default();
        assert!(slot.allows("modal-1"));

        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        slot.set(Rc::new(move || {
            seen.set(seen.get() + 1);
            Ok(false)
        }));
        assert!(!slot.allows("modal-1"));
        assert_eq!(calls.get(), 1);

        slot.set(Rc::new(|| Err(GuardError::new("unsaved"))));
        assert!(!slot.allows("modal-1"));

        slot.clear();
        assert!(slot.allows("modal-1"));
        assert_eq!(calls.get(), 1);
    }
}
