#![forbid(unsafe_code)]

//! Handle to one open drop-down.
//!
//! Drop-downs have no close guard: `close` always starts the closing
//! transition unless one is already running. `after_closed` emits once,
//! after disposal, then completes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use portalkit_runtime::{EventStream, Subject, TimerId};

use crate::overlay::OverlayHandle;
use crate::stack::OverlayEntry;
use crate::transition::PortalAnimator;

/// Type-erased view of an open drop-down, as kept on the stack.
pub trait DropDownHandle: OverlayEntry {
    fn level(&self) -> usize;
    fn is_closing(&self) -> bool;
    fn overlay(&self) -> Rc<dyn OverlayHandle>;
}

struct DropDownInner<C, R> {
    id: String,
    level: Cell<usize>,
    animation_enabled: bool,
    animation_duration: Duration,
    closing: Cell<bool>,
    opening_timer: Cell<Option<TimerId>>,
    component: RefCell<Option<C>>,
    after_closed: Subject<Option<R>>,
    overlay: Rc<dyn OverlayHandle>,
    animator: PortalAnimator,
}

/// Handle to an open drop-down. Clones refer to the same drop-down.
pub struct DropDownRef<C, R = ()> {
    inner: Rc<DropDownInner<C, R>>,
}

impl<C, R> Clone for DropDownRef<C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C, R> fmt::Debug for DropDownRef<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropDownRef")
            .field("id", &self.inner.id)
            .field("level", &self.inner.level.get())
            .field("closing", &self.inner.closing.get())
            .finish()
    }
}

pub(crate) struct WeakDropDownRef<C, R> {
    inner: Weak<DropDownInner<C, R>>,
}

impl<C, R> WeakDropDownRef<C, R> {
    pub(crate) fn upgrade(&self) -> Option<DropDownRef<C, R>> {
        self.inner.upgrade().map(|inner| DropDownRef { inner })
    }
}

impl<C: 'static, R: 'static> DropDownRef<C, R> {
    pub(crate) fn new(
        id: String,
        overlay: Rc<dyn OverlayHandle>,
        animator: PortalAnimator,
        animation_enabled: bool,
        animation_duration: Duration,
    ) -> Self {
        Self {
            inner: Rc::new(DropDownInner {
                id,
                level: Cell::new(0),
                animation_enabled,
                animation_duration,
                closing: Cell::new(false),
                opening_timer: Cell::new(None),
                component: RefCell::new(None),
                after_closed: Subject::new(),
                overlay,
                animator,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn level(&self) -> usize {
        self.inner.level.get()
    }

    pub fn is_closing(&self) -> bool {
        self.inner.closing.get()
    }

    pub fn overlay(&self) -> Rc<dyn OverlayHandle> {
        Rc::clone(&self.inner.overlay)
    }

    /// Run `f` on the mounted component. `None` once the drop-down is closed.
    pub fn with_component<T>(&self, f: impl FnOnce(&C) -> T) -> Option<T> {
        self.inner.component.borrow().as_ref().map(f)
    }

    /// Close with `result`. Returns whether this call started the close.
    pub fn close(&self, result: Option<R>) -> bool {
        if self.inner.closing.replace(true) {
            return false;
        }
        if let Some(timer) = self.inner.opening_timer.take() {
            self.inner.animator.cancel(timer);
        }
        tracing::debug!(dropdown = %self.inner.id, "close started");
        let inner = Rc::clone(&self.inner);
        self.inner.animator.apply_closing(
            &*self.inner.overlay,
            self.inner.animation_enabled,
            self.inner.animation_duration,
            Box::new(move || {
                let component = inner.component.borrow_mut().take();
                inner.overlay.dispose();
                drop(component);
                inner.after_closed.emit_and_complete(result);
            }),
        );
        true
    }

    /// Emits the close result once the drop-down is gone, then completes.
    pub fn after_closed(&self) -> EventStream<Option<R>> {
        self.inner.after_closed.stream()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakDropDownRef<C, R> {
        WeakDropDownRef {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn set_level(&self, level: usize) {
        self.inner.level.set(level);
    }

    pub(crate) fn attach_component(&self, component: C) {
        *self.inner.component.borrow_mut() = Some(component);
    }

    pub(crate) fn set_opening_timer(&self, timer: Option<TimerId>) {
        self.inner.opening_timer.set(timer);
    }
}

impl<C: 'static, R: 'static> OverlayEntry for DropDownRef<C, R> {
    fn id(&self) -> &str {
        &self.inner.id
    }

    fn close(&self) {
        DropDownRef::close(self, None);
    }
}

impl<C: 'static, R: 'static> DropDownHandle for DropDownRef<C, R> {
    fn level(&self) -> usize {
        DropDownRef::level(self)
    }

    fn is_closing(&self) -> bool {
        DropDownRef::is_closing(self)
    }

    fn overlay(&self) -> Rc<dyn OverlayHandle> {
        DropDownRef::overlay(self)
    }
}
