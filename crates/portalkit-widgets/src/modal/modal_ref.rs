#![forbid(unsafe_code)]

//! Handle to one open modal.
//!
//! # Invariants
//!
//! - The close sequence runs at most once; the closing flag only goes
//!   `false → true`.
//! - `after_closed` emits exactly once, after the overlay is disposed, then
//!   completes. The result carries why the modal closed.
//! - A pending opening transition is cancelled when the close starts.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use portalkit_runtime::{EventStream, Subject, TimerId};

use crate::guard::{CloseGuard, GuardError, GuardSlot};
use crate::overlay::OverlayHandle;
use crate::stack::OverlayEntry;
use crate::transition::PortalAnimator;

/// Why a modal closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Click on the backdrop of the topmost modal.
    Backdrop,
    /// Escape pressed while the modal was topmost.
    Escape,
    /// A `close` or `force_close` call.
    Programmatic,
}

/// What [`ModalRef::after_closed`] emits.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseResult<R> {
    pub reason: CloseReason,
    pub data: Option<R>,
}

/// Type-erased view of an open modal, as kept on the stack.
pub trait ModalHandle: OverlayEntry {
    fn level(&self) -> usize;
    fn is_closing(&self) -> bool;
    fn overlay(&self) -> Rc<dyn OverlayHandle>;
    /// Guarded close with no result.
    fn close_for(&self, reason: CloseReason) -> bool;
}

struct ModalInner<C, R> {
    id: String,
    level: Cell<usize>,
    animation_enabled: bool,
    animation_duration: Duration,
    closing: Cell<bool>,
    opening_timer: Cell<Option<TimerId>>,
    component: RefCell<Option<C>>,
    guard: GuardSlot,
    after_closed: Subject<CloseResult<R>>,
    overlay: Rc<dyn OverlayHandle>,
    animator: PortalAnimator,
}

/// Handle to an open modal. Clones refer to the same modal.
pub struct ModalRef<C, R = ()> {
    inner: Rc<ModalInner<C, R>>,
}

impl<C, R> Clone for ModalRef<C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C, R> fmt::Debug for ModalRef<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRef")
            .field("id", &self.inner.id)
            .field("level", &self.inner.level.get())
            .field("closing", &self.inner.closing.get())
            .finish()
    }
}

/// Non-owning handle for callbacks registered on the modal's own overlay.
pub struct WeakModalRef<C, R> {
    inner: Weak<ModalInner<C, R>>,
}

impl<C, R> Clone for WeakModalRef<C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<C, R> WeakModalRef<C, R> {
    pub fn upgrade(&self) -> Option<ModalRef<C, R>> {
        self.inner.upgrade().map(|inner| ModalRef { inner })
    }
}

impl<C: 'static, R: 'static> ModalRef<C, R> {
    pub(crate) fn new(
        id: String,
        overlay: Rc<dyn OverlayHandle>,
        animator: PortalAnimator,
        animation_enabled: bool,
        animation_duration: Duration,
        guard: Option<CloseGuard>,
    ) -> Self {
        Self {
            inner: Rc::new(ModalInner {
                id,
                level: Cell::new(0),
                animation_enabled,
                animation_duration,
                closing: Cell::new(false),
                opening_timer: Cell::new(None),
                component: RefCell::new(None),
                guard: GuardSlot::new(guard),
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

    /// Run `f` on the mounted component. `None` once the modal is closed.
    pub fn with_component<T>(&self, f: impl FnOnce(&C) -> T) -> Option<T> {
        self.inner.component.borrow().as_ref().map(f)
    }

    pub fn set_before_close_guard(
        &self,
        guard: impl Fn() -> Result<bool, GuardError> + 'static,
    ) {
        self.inner.guard.set(Rc::new(guard));
    }

    pub fn clear_before_close_guard(&self) {
        self.inner.guard.clear();
    }

    /// Whether a guarded close would go ahead right now. Runs the guard.
    pub fn can_close(&self) -> bool {
        !self.is_closing() && self.inner.guard.allows(&self.inner.id)
    }

    /// Close with `result` if the guard allows.
    pub fn close(&self, result: Option<R>) -> bool {
        self.close_with_reason(result, CloseReason::Programmatic)
    }

    /// Close with `result` and an explicit reason if the guard allows.
    /// Returns whether this call started the close sequence.
    pub fn close_with_reason(&self, result: Option<R>, reason: CloseReason) -> bool {
        if self.is_closing() || !self.inner.guard.allows(&self.inner.id) {
            return false;
        }
        self.finish_close(result, reason)
    }

    /// Close with `result`, ignoring the guard.
    pub fn force_close(&self, result: Option<R>, reason: CloseReason) -> bool {
        self.finish_close(result, reason)
    }

    /// Emits the close result once the modal is gone, then completes.
    pub fn after_closed(&self) -> EventStream<CloseResult<R>> {
        self.inner.after_closed.stream()
    }

    pub fn downgrade(&self) -> WeakModalRef<C, R> {
        WeakModalRef {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
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

    fn finish_close(&self, data: Option<R>, reason: CloseReason) -> bool {
        if self.inner.closing.replace(true) {
            return false;
        }
        if let Some(timer) = self.inner.opening_timer.take() {
            self.inner.animator.cancel(timer);
        }
        tracing::debug!(modal = %self.inner.id, ?reason, "close started");
        let inner = Rc::clone(&self.inner);
        self.inner.animator.apply_closing(
            &*self.inner.overlay,
            self.inner.animation_enabled,
            self.inner.animation_duration,
            Box::new(move || {
                let component = inner.component.borrow_mut().take();
                inner.overlay.dispose();
                drop(component);
                tracing::debug!(modal = %inner.id, "close completed");
                inner.after_closed.emit_and_complete(CloseResult { reason, data });
            }),
        );
        true
    }
}

impl<C: 'static, R: 'static> OverlayEntry for ModalRef<C, R> {
    fn id(&self) -> &str {
        &self.inner.id
    }

    fn close(&self) {
        ModalRef::close(self, None);
    }
}

impl<C: 'static, R: 'static> ModalHandle for ModalRef<C, R> {
    fn level(&self) -> usize {
        ModalRef::level(self)
    }

    fn is_closing(&self) -> bool {
        ModalRef::is_closing(self)
    }

    fn overlay(&self) -> Rc<dyn OverlayHandle> {
        ModalRef::overlay(self)
    }

    fn close_for(&self, reason: CloseReason) -> bool {
        self.close_with_reason(None, reason)
    }
}
