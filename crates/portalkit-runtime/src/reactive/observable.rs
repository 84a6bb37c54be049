#![forbid(unsafe_code)]

//! Version-tracked shared values.
//!
//! [`Observable<T>`] wraps a value in `Rc<RefCell<..>>` and notifies
//! subscribers whenever it changes. Used for live counters such as the
//! number of open sheets.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::subject::{Subject, Subscription};

struct Inner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    changes: Subject<T>,
}

/// A shared value with change notification.
///
/// Clones share the same underlying value.
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                version: Cell::new(0),
                changes: Subject::new(),
            }),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value.clone();
        }
        self.inner.version.set(self.inner.version.get() + 1);
        self.inner.changes.emit(value);
    }

    /// Number of changes so far.
    #[inline]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Call `callback` with every new value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.changes.subscribe(callback)
    }

    /// A view without write access.
    pub fn read_only(&self) -> ReadOnlyObservable<T> {
        ReadOnlyObservable {
            source: self.clone(),
        }
    }
}

/// Read-only view of an [`Observable`].
pub struct ReadOnlyObservable<T> {
    source: Observable<T>,
}

impl<T> Clone for ReadOnlyObservable<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnlyObservable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.source, f)
    }
}

impl<T: Clone + PartialEq + 'static> ReadOnlyObservable<T> {
    #[must_use]
    pub fn get(&self) -> T {
        self.source.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.source.with(f)
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.source.version()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.source.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_bumps_version_and_notifies() {
        let count = Observable::new(0usize);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = count.subscribe(move |v| sink.borrow_mut().push(*v));

        count.set(1);
        count.set(2);
        assert_eq!(count.get(), 2);
        assert_eq!(count.version(), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn equal_value_is_noop() {
        let count = Observable::new(5);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = count.subscribe(move |_| h.set(h.get() + 1));

        count.set(5);
        assert_eq!(count.version(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn read_only_view_tracks_source() {
        let count = Observable::new(0);
        let view = count.read_only();
        count.set(3);
        assert_eq!(view.get(), 3);
        assert_eq!(view.version(), 1);
        assert_eq!(view.with(|v| v * 2), 6);
    }

    #[test]
    fn subscriber_may_read_during_notification() {
        let count = Observable::new(0);
        let reader = count.clone();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = count.subscribe(move |_| s.set(reader.get()));
        count.set(9);
        assert_eq!(seen.get(), 9);
    }
}
