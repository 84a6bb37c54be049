#![forbid(unsafe_code)]

//! Reference-counted body style lock for active drags.
//!
//! While any sheet is being dragged the document body must suppress text
//! selection and touch scrolling. Several drags may overlap (two sheets, or
//! a drag that is force-disabled mid-gesture), so the styles are owned by a
//! counter rather than by whichever drag happened to start first.
//!
//! # Invariants
//!
//! - The styles are applied iff at least one [`DragStyleGuard`] is alive.
//! - The guard that drops the count to zero restores the styles, whatever
//!   path dropped it (normal end, cancel, or teardown).

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::dom::StyleTarget;

const SUPPRESSED: [(&str, &str); 2] = [("user-select", "none"), ("touch-action", "none")];

struct LockInner {
    target: Rc<dyn StyleTarget>,
    holders: Cell<usize>,
}

/// Shared lock over the drag-suppressing body styles.
///
/// Cloning shares the counter.
#[derive(Clone)]
pub struct DragStyleLock {
    inner: Rc<LockInner>,
}

impl fmt::Debug for DragStyleLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragStyleLock")
            .field("holders", &self.inner.holders.get())
            .finish()
    }
}

impl DragStyleLock {
    /// Create a lock over `target` (normally the document body).
    pub fn new(target: Rc<dyn StyleTarget>) -> Self {
        Self {
            inner: Rc::new(LockInner {
                target,
                holders: Cell::new(0),
            }),
        }
    }

    /// Take a hold on the lock, applying the styles if this is the first.
    #[must_use = "dropping the guard releases the lock immediately"]
    pub fn acquire(&self) -> DragStyleGuard {
        let holders = self.inner.holders.get();
        if holders == 0 {
            for (property, value) in SUPPRESSED {
                self.inner.target.set_style(property, value);
            }
        }
        self.inner.holders.set(holders + 1);
        DragStyleGuard {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Number of live guards.
    #[inline]
    pub fn holders(&self) -> usize {
        self.inner.holders.get()
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.holders() > 0
    }
}

/// RAII hold on a [`DragStyleLock`].
#[must_use = "dropping the guard releases the lock immediately"]
pub struct DragStyleGuard {
    inner: Rc<LockInner>,
}

impl fmt::Debug for DragStyleGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragStyleGuard").finish_non_exhaustive()
    }
}

impl Drop for DragStyleGuard {
    fn drop(&mut self) {
        let holders = self.inner.holders.get().saturating_sub(1);
        self.inner.holders.set(holders);
        if holders == 0 {
            for (property, _) in SUPPRESSED {
                self.inner.target.remove_style(property);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Body(RefCell<HashMap<String, String>>);

    impl StyleTarget for Body {
        fn set_style(&self, property: &str, value: &str) {
            self.0
                .borrow_mut()
                .insert(property.to_string(), value.to_string());
        }
        fn remove_style(&self, property: &str) {
            self.0.borrow_mut().remove(property);
        }
        fn style(&self, property: &str) -> Option<String> {
            self.0.borrow().get(property).cloned()
        }
    }

    #[test]
    fn single_guard_applies_and_restores() {
        let body = Rc::new(Body::default());
        let lock = DragStyleLock::new(body.clone());
        {
            let _guard = lock.acquire();
            assert_eq!(body.style("user-select").as_deref(), Some("none"));
            assert_eq!(body.style("touch-action").as_deref(), Some("none"));
            assert!(lock.is_held());
        }
        assert_eq!(body.style("user-select"), None);
        assert_eq!(body.style("touch-action"), None);
        assert!(!lock.is_held());
    }

    #[test]
    fn overlapping_guards_restore_on_last_drop() {
        let body = Rc::new(Body::default());
        let lock = DragStyleLock::new(body.clone());
        let first = lock.acquire();
        let second = lock.clone().acquire();
        assert_eq!(lock.holders(), 2);

        drop(first);
        assert_eq!(body.style("user-select").as_deref(), Some("none"));

        drop(second);
        assert_eq!(body.style("user-select"), None);
        assert_eq!(lock.holders(), 0);
    }
}
