#![forbid(unsafe_code)]

//! The modal service.
//!
//! [`Modal::open`] creates a centered overlay, puts it on the modal stack,
//! mounts the component and runs the opening transition. Backdrop clicks and
//! Escape close only the topmost modal, and only through its guard.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use portalkit_a11y::{Accessibility, FocusTrap};
use portalkit_core::dom::SurfaceElement;
use portalkit_core::event::NodeId;
use portalkit_runtime::{ReadOnlyObservable, Scheduler, Subscription};

use super::config::ModalConfig;
use super::modal_ref::{CloseReason, ModalHandle, ModalRef, WeakModalRef};
use crate::overlay::{OverlayConfig, OverlayHandle, OverlayHost, PositionStrategy};
use crate::portal::PortalConfig;
use crate::stack::{StackManager, generate_id};
use crate::transition::{PortalAnimator, TransitionStyle};

const BACKDROP_CLASS: &str = "modal-backdrop";
const ID_PREFIX: &str = "modal";

/// What the mount closure receives.
pub struct ModalContext<D, C, R> {
    /// Node the component renders into.
    pub surface: Rc<dyn SurfaceElement>,
    pub data: Option<D>,
    /// Handle of the modal being opened.
    pub modal: ModalRef<C, R>,
}

impl<D: fmt::Debug, C, R> fmt::Debug for ModalContext<D, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContext")
            .field("data", &self.data)
            .field("modal", &self.modal)
            .finish_non_exhaustive()
    }
}

struct ModalRecord {
    focus_trap: Option<Box<dyn FocusTrap>>,
    subscriptions: Vec<Subscription>,
    previously_focused: Option<NodeId>,
}

struct ServiceInner {
    host: Rc<dyn OverlayHost>,
    a11y: Rc<dyn Accessibility>,
    stack: StackManager<Rc<dyn ModalHandle>>,
    animator: PortalAnimator,
    modals: RefCell<AHashMap<String, ModalRecord>>,
}

/// Opens and tracks modals. Clones share the same stack.
#[derive(Clone)]
pub struct Modal {
    inner: Rc<ServiceInner>,
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("stack", &self.inner.stack)
            .finish_non_exhaustive()
    }
}

impl Modal {
    pub fn new(
        host: Rc<dyn OverlayHost>,
        a11y: Rc<dyn Accessibility>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            inner: Rc::new(ServiceInner {
                host,
                a11y,
                stack: StackManager::new(),
                animator: PortalAnimator::new(scheduler, TransitionStyle::MODAL),
                modals: RefCell::new(AHashMap::new()),
            }),
        }
    }

    /// Open a modal, mounting the component built by `mount`.
    pub fn open<C, D, R>(
        &self,
        config: ModalConfig<D>,
        mount: impl FnOnce(ModalContext<D, C, R>) -> C,
    ) -> ModalRef<C, R>
    where
        C: 'static,
        R: 'static,
    {
        let inner = &self.inner;
        let ModalConfig {
            base,
            width,
            height,
            role,
            animation,
            animation_duration,
            before_close,
        } = config;
        let PortalConfig {
            data,
            has_backdrop,
            backdrop_class,
            disable_close,
            panel_class,
            aria,
            focus_trap,
        } = base;

        let id = generate_id(ID_PREFIX);
        let overlay = inner.host.create(&OverlayConfig {
            has_backdrop,
            backdrop_class: backdrop_class.unwrap_or_else(|| BACKDROP_CLASS.to_owned()),
            panel_classes: panel_class,
            width,
            height,
            max_width: "100vw".to_owned(),
            position: PositionStrategy::Centered,
        });
        let surface = overlay.surface();

        let modal: ModalRef<C, R> = ModalRef::new(
            id.clone(),
            Rc::clone(&overlay),
            inner.animator.clone(),
            animation,
            animation_duration,
            before_close,
        );
        let level = inner.stack.add_to_stack(Rc::new(modal.clone()));
        modal.set_level(level);
        inner.stack.set_z_index(&*overlay, level);
        if inner.stack.size() == 1 {
            inner.a11y.disable_body_scroll();
        }

        let component = mount(ModalContext {
            surface: Rc::clone(&surface),
            data,
            modal: modal.clone(),
        });
        modal.attach_component(component);
        inner.a11y.set_aria_attributes(&*surface, &aria, role);

        let opening = inner
            .animator
            .apply_opening(&*overlay, animation, animation_duration);
        modal.set_opening_timer(opening);

        let previously_focused = inner.a11y.active_element();
        let focus_trap = focus_trap.then(|| inner.a11y.create_focus_trap(Rc::clone(&surface), true));
        let subscriptions = self.subscribe_overlay(&modal, &*overlay, has_backdrop, disable_close);
        inner.modals.borrow_mut().insert(
            id.clone(),
            ModalRecord {
                focus_trap,
                subscriptions,
                previously_focused,
            },
        );

        tracing::debug!(modal = %id, level, "modal opened");
        modal
    }

    /// Close every open modal through its guard, topmost first.
    pub fn close_all(&self) {
        self.inner.stack.close_all();
    }

    /// Live number of open modals.
    pub fn open_count(&self) -> ReadOnlyObservable<usize> {
        self.inner.stack.open_count()
    }

    /// Open modals, bottom-most first.
    pub fn open_modals(&self) -> Vec<Rc<dyn ModalHandle>> {
        self.inner.stack.get_all()
    }

    pub fn is_topmost(&self, id: &str) -> bool {
        self.inner.stack.is_topmost(id)
    }

    fn subscribe_overlay<C: 'static, R: 'static>(
        &self,
        modal: &ModalRef<C, R>,
        overlay: &dyn OverlayHandle,
        has_backdrop: bool,
        disable_close: bool,
    ) -> Vec<Subscription> {
        let mut subscriptions = Vec::with_capacity(3);

        if has_backdrop && !disable_close {
            let service = Rc::downgrade(&self.inner);
            let weak_modal = modal.downgrade();
            subscriptions.push(overlay.backdrop_click().subscribe(move |_| {
                close_if_topmost(&service, &weak_modal, CloseReason::Backdrop);
            }));
        }

        if !disable_close {
            let service = Rc::downgrade(&self.inner);
            let weak_modal = modal.downgrade();
            subscriptions.push(overlay.keydown().subscribe(move |key| {
                if key.is_escape() {
                    close_if_topmost(&service, &weak_modal, CloseReason::Escape);
                }
            }));
        }

        let service = Rc::downgrade(&self.inner);
        let id = modal.id().to_owned();
        subscriptions.push(overlay.detachments().subscribe(move |_| {
            if let Some(service) = service.upgrade() {
                service.cleanup(&id);
            }
        }));

        subscriptions
    }
}

impl ServiceInner {
    fn cleanup(&self, id: &str) {
        self.stack.remove_from_stack(id);
        let record = self.modals.borrow_mut().remove(id);
        let Some(mut record) = record else {
            return;
        };
        if let Some(trap) = record.focus_trap.as_mut() {
            trap.destroy();
        }
        if self.stack.is_empty() {
            self.a11y.enable_body_scroll();
            self.a11y.restore_focus(record.previously_focused);
        }
        tracing::debug!(modal = id, remaining = self.stack.size(), "modal detached");
        drop(record);
    }
}

fn close_if_topmost<C: 'static, R: 'static>(
    service: &Weak<ServiceInner>,
    modal: &WeakModalRef<C, R>,
    reason: CloseReason,
) {
    let (Some(service), Some(modal)) = (service.upgrade(), modal.upgrade()) else {
        return;
    };
    if service.stack.is_topmost(modal.id()) {
        modal.close_with_reason(None, reason);
    }
}
