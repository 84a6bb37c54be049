#![forbid(unsafe_code)]

//! Handle to one open bottom sheet.
//!
//! # Invariants
//!
//! - The close sequence runs at most once: the closing flag only goes
//!   `false → true`, and every entry point checks it first.
//! - `after_closed` emits exactly once, after the overlay is disposed, then
//!   completes. `after_dismissed` emits only when `dismiss` started the close.
//! - On a dismissal `after_dismissed` emits before `after_closed`, with or
//!   without animation: it fires as the close starts, before the closing
//!   transition is scheduled or run.
//! - The mounted component is dropped exactly once, when the overlay is
//!   disposed.
//!
//! # Close guard
//!
//! `close` consults the guard set with
//! [`set_before_close_guard`](BottomSheetRef::set_before_close_guard);
//! `force_close` skips it. A guard error denies the close and is logged.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use portalkit_runtime::{EventStream, Subject, TimerId};

use super::animation::SheetAnimator;
use crate::guard::{GuardError, GuardSlot};
use crate::overlay::OverlayHandle;
use crate::stack::OverlayEntry;

/// Type-erased view of an open sheet, as kept on the stack.
pub trait SheetHandle: OverlayEntry {
    fn level(&self) -> usize;
    fn current_snap_point_index(&self) -> usize;
    fn update_snap_point(&self, index: usize);
    fn is_closing(&self) -> bool;
    fn animation_enabled(&self) -> bool;
    fn animation_duration(&self) -> Duration;
    fn overlay(&self) -> Rc<dyn OverlayHandle>;
    /// Guarded close with no result, plus the dismissed notification.
    fn dismiss(&self) -> bool;
}

struct RefInner<C, R> {
    id: String,
    level: Cell<usize>,
    current_snap_point_index: Cell<usize>,
    animation_enabled: bool,
    animation_duration: Duration,
    closing: Cell<bool>,
    opening_timer: Cell<Option<TimerId>>,
    component: RefCell<Option<C>>,
    guard: GuardSlot,
    after_closed: Subject<Option<R>>,
    after_dismissed: Subject<()>,
    overlay: Rc<dyn OverlayHandle>,
    animator: SheetAnimator,
}

/// Handle to an open bottom sheet. Clones refer to the same sheet.
pub struct BottomSheetRef<C, R = ()> {
    inner: Rc<RefInner<C, R>>,
}

impl<C, R> Clone for BottomSheetRef<C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C, R> fmt::Debug for BottomSheetRef<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BottomSheetRef")
            .field("id", &self.inner.id)
            .field("level", &self.inner.level.get())
            .field("snap_index", &self.inner.current_snap_point_index.get())
            .field("closing", &self.inner.closing.get())
            .finish()
    }
}

/// Non-owning handle, used by callbacks registered on the sheet's own nodes.
pub struct WeakSheetRef<C, R> {
    inner: Weak<RefInner<C, R>>,
}

impl<C, R> Clone for WeakSheetRef<C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<C, R> WeakSheetRef<C, R> {
    pub fn upgrade(&self) -> Option<BottomSheetRef<C, R>> {
        self.inner.upgrade().map(|inner| BottomSheetRef { inner })
    }
}

impl<C: 'static, R: 'static> BottomSheetRef<C, R> {
    pub(crate) fn new(
        id: String,
        overlay: Rc<dyn OverlayHandle>,
        animator: SheetAnimator,
        animation_enabled: bool,
        animation_duration: Duration,
    ) -> Self {
        Self {
            inner: Rc::new(RefInner {
                id,
                level: Cell::new(0),
                current_snap_point_index: Cell::new(0),
                animation_enabled,
                animation_duration,
                closing: Cell::new(false),
                opening_timer: Cell::new(None),
                component: RefCell::new(None),
                guard: GuardSlot::default(),
                after_closed: Subject::new(),
                after_dismissed: Subject::new(),
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

    pub fn current_snap_point_index(&self) -> usize {
        self.inner.current_snap_point_index.get()
    }

    /// Record the snap point the sheet rests at, by declared index.
    pub fn update_snap_point(&self, index: usize) {
        self.inner.current_snap_point_index.set(index);
    }

    pub fn is_closing(&self) -> bool {
        self.inner.closing.get()
    }

    pub fn animation_enabled(&self) -> bool {
        self.inner.animation_enabled
    }

    pub fn animation_duration(&self) -> Duration {
        self.inner.animation_duration
    }

    pub fn overlay(&self) -> Rc<dyn OverlayHandle> {
        Rc::clone(&self.inner.overlay)
    }

    /// Run `f` on the mounted component. `None` once the sheet is closed.
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

    /// Close with `result` if the guard allows. Returns whether this call
    /// started the close sequence.
    pub fn close(&self, result: Option<R>) -> bool {
        if self.is_closing() || !self.guard_allows() {
            return false;
        }
        self.finish_close(result, false)
    }

    /// Close with `result`, ignoring the guard.
    pub fn force_close(&self, result: Option<R>) -> bool {
        self.finish_close(result, false)
    }

    /// Close with no result and notify `after_dismissed`.
    pub fn dismiss(&self) -> bool {
        if self.is_closing() || !self.guard_allows() {
            return false;
        }
        self.finish_close(None, true)
    }

    /// Emits the close result once the sheet is gone, then completes.
    pub fn after_closed(&self) -> EventStream<Option<R>> {
        self.inner.after_closed.stream()
    }

    /// Emits once if the sheet was dismissed, then completes.
    pub fn after_dismissed(&self) -> EventStream<()> {
        self.inner.after_dismissed.stream()
    }

    pub fn downgrade(&self) -> WeakSheetRef<C, R> {
        WeakSheetRef {
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

    fn guard_allows(&self) -> bool {
        self.inner.guard.allows(&self.inner.id)
    }

    fn finish_close(&self, result: Option<R>, dismissed: bool) -> bool {
        if self.inner.closing.replace(true) {
            return false;
        }
        if let Some(timer) = self.inner.opening_timer.take() {
            self.inner.animator.cancel(timer);
        }
        tracing::debug!(sheet = %self.inner.id, dismissed, "close started");
        if dismissed {
            self.inner.after_dismissed.emit_and_complete(());
        }
        let inner = Rc::clone(&self.inner);
        self.inner.animator.apply_closing(
            &*self.inner.overlay,
            self.inner.animation_enabled,
            self.inner.animation_duration,
            Box::new(move || {
                let component = inner.component.borrow_mut().take();
                inner.overlay.dispose();
                drop(component);
                tracing::debug!(sheet = %inner.id, "close completed");
                inner.after_closed.emit_and_complete(result);
            }),
        );
        true
    }
}

impl<C: 'static, R: 'static> OverlayEntry for BottomSheetRef<C, R> {
    fn id(&self) -> &str {
        &self.inner.id
    }

    fn close(&self) {
        BottomSheetRef::close(self, None);
    }
}

impl<C: 'static, R: 'static> SheetHandle for BottomSheetRef<C, R> {
    fn level(&self) -> usize {
        BottomSheetRef::level(self)
    }

    fn current_snap_point_index(&self) -> usize {
        BottomSheetRef::current_snap_point_index(self)
    }

    fn update_snap_point(&self, index: usize) {
        BottomSheetRef::update_snap_point(self, index);
    }

    fn is_closing(&self) -> bool {
        BottomSheetRef::is_closing(self)
    }

    fn animation_enabled(&self) -> bool {
        BottomSheetRef::animation_enabled(self)
    }

    fn animation_duration(&self) -> Duration {
        BottomSheetRef::animation_duration(self)
    }

    fn overlay(&self) -> Rc<dyn OverlayHandle> {
        BottomSheetRef::overlay(self)
    }

    fn dismiss(&self) -> bool {
        BottomSheetRef::dismiss(self)
    }
}
