#![forbid(unsafe_code)]

//! The drop-down service.
//!
//! A drop-down opens below an origin node when one is given, at fixed
//! offsets when only offsets are given, and centered otherwise. Body scroll
//! is locked only while a drop-down with a backdrop is open.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use portalkit_a11y::{Accessibility, AriaRole, FocusTrap};
use portalkit_core::dom::SurfaceElement;
use portalkit_core::event::NodeId;
use portalkit_runtime::{ReadOnlyObservable, Scheduler, Subscription};

use super::config::DropDownConfig;
use super::dropdown_ref::{DropDownHandle, DropDownRef, WeakDropDownRef};
use crate::overlay::{OverlayConfig, OverlayHandle, OverlayHost, PositionStrategy};
use crate::portal::PortalConfig;
use crate::stack::{StackManager, generate_id};
use crate::transition::{PortalAnimator, TransitionStyle};

const BACKDROP_CLASS: &str = "dropdown-backdrop";
const ID_PREFIX: &str = "drop-down";

/// What the mount closure receives.
pub struct DropDownContext<D, C, R> {
    /// Node the component renders into.
    pub surface: Rc<dyn SurfaceElement>,
    pub data: Option<D>,
    /// Handle of the drop-down being opened.
    pub dropdown: DropDownRef<C, R>,
}

impl<D: fmt::Debug, C, R> fmt::Debug for DropDownContext<D, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropDownContext")
            .field("data", &self.data)
            .field("dropdown", &self.dropdown)
            .finish_non_exhaustive()
    }
}

struct DropDownRecord {
    focus_trap: Option<Box<dyn FocusTrap>>,
    subscriptions: Vec<Subscription>,
    previously_focused: Option<NodeId>,
}

struct ServiceInner {
    host: Rc<dyn OverlayHost>,
    a11y: Rc<dyn Accessibility>,
    stack: StackManager<Rc<dyn DropDownHandle>>,
    animator: PortalAnimator,
    scroll_locked: Cell<bool>,
    dropdowns: RefCell<AHashMap<String, DropDownRecord>>,
}

/// Opens and tracks drop-downs. Clones share the same stack.
#[derive(Clone)]
pub struct DropDown {
    inner: Rc<ServiceInner>,
}

impl fmt::Debug for DropDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropDown")
            .field("stack", &self.inner.stack)
            .field("scroll_locked", &self.inner.scroll_locked.get())
            .finish_non_exhaustive()
    }
}

impl DropDown {
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
                animator: PortalAnimator::new(scheduler, TransitionStyle::DROPDOWN),
                scroll_locked: Cell::new(false),
                dropdowns: RefCell::new(AHashMap::new()),
            }),
        }
    }

    /// Open a drop-down, anchored to `origin` if given.
    pub fn open<C, D, R>(
        &self,
        config: DropDownConfig<D>,
        origin: Option<&dyn SurfaceElement>,
        mount: impl FnOnce(DropDownContext<D, C, R>) -> C,
    ) -> DropDownRef<C, R>
    where
        C: 'static,
        R: 'static,
    {
        let inner = &self.inner;
        let position = position_for(origin, config.x_offset, config.y_offset);
        let DropDownConfig {
            base,
            auto_close_on_click_outside,
            auto_close_on_escape,
            width,
            height,
            animation,
            animation_duration,
            ..
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
            position,
        });
        let surface = overlay.surface();

        let dropdown: DropDownRef<C, R> = DropDownRef::new(
            id.clone(),
            Rc::clone(&overlay),
            inner.animator.clone(),
            animation,
            animation_duration,
        );
        let level = inner.stack.add_to_stack(Rc::new(dropdown.clone()));
        dropdown.set_level(level);
        inner.stack.set_z_index(&*overlay, level);
        if has_backdrop && !inner.scroll_locked.replace(true) {
            inner.a11y.disable_body_scroll();
        }

        let component = mount(DropDownContext {
            surface: Rc::clone(&surface),
            data,
            dropdown: dropdown.clone(),
        });
        dropdown.attach_component(component);
        inner.a11y.set_aria_attributes(&*surface, &aria, AriaRole::Menu);

        let opening = inner
            .animator
            .apply_opening(&*overlay, animation, animation_duration);
        dropdown.set_opening_timer(opening);

        let previously_focused = inner.a11y.active_element();
        let focus_trap = focus_trap.then(|| inner.a11y.create_focus_trap(Rc::clone(&surface), true));
        let close_on_backdrop = has_backdrop && auto_close_on_click_outside && !disable_close;
        let close_on_escape = auto_close_on_escape && !disable_close;
        let subscriptions =
            self.subscribe_overlay(&dropdown, &*overlay, close_on_backdrop, close_on_escape);
        inner.dropdowns.borrow_mut().insert(
            id.clone(),
            DropDownRecord {
                focus_trap,
                subscriptions,
                previously_focused,
            },
        );

        tracing::debug!(dropdown = %id, level, ?position, "drop-down opened");
        dropdown
    }

    /// Close every open drop-down, topmost first.
    pub fn close_all(&self) {
        self.inner.stack.close_all();
    }

    /// Live number of open drop-downs.
    pub fn open_count(&self) -> ReadOnlyObservable<usize> {
        self.inner.stack.open_count()
    }

    /// Open drop-downs, bottom-most first.
    pub fn open_dropdowns(&self) -> Vec<Rc<dyn DropDownHandle>> {
        self.inner.stack.get_all()
    }

    pub fn is_topmost(&self, id: &str) -> bool {
        self.inner.stack.is_topmost(id)
    }

    fn subscribe_overlay<C: 'static, R: 'static>(
        &self,
        dropdown: &DropDownRef<C, R>,
        overlay: &dyn OverlayHandle,
        close_on_backdrop: bool,
        close_on_escape: bool,
    ) -> Vec<Subscription> {
        let mut subscriptions = Vec::with_capacity(3);

        if close_on_backdrop {
            let service = Rc::downgrade(&self.inner);
            let weak = dropdown.downgrade();
            subscriptions.push(overlay.backdrop_click().subscribe(move |_| {
                close_if_topmost(&service, &weak);
            }));
        }

        if close_on_escape {
            let service = Rc::downgrade(&self.inner);
            let weak = dropdown.downgrade();
            subscriptions.push(overlay.keydown().subscribe(move |key| {
                if key.is_escape() {
                    close_if_topmost(&service, &weak);
                }
            }));
        }

        let service = Rc::downgrade(&self.inner);
        let id = dropdown.id().to_owned();
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
        let record = self.dropdowns.borrow_mut().remove(id);
        let Some(mut record) = record else {
            return;
        };
        if let Some(trap) = record.focus_trap.as_mut() {
            trap.destroy();
        }
        if self.stack.is_empty() {
            if self.scroll_locked.replace(false) {
                self.a11y.enable_body_scroll();
            }
            self.a11y.restore_focus(record.previously_focused);
        }
        tracing::debug!(dropdown = id, remaining = self.stack.size(), "drop-down detached");
        drop(record);
    }
}

fn close_if_topmost<C: 'static, R: 'static>(
    service: &Weak<ServiceInner>,
    dropdown: &WeakDropDownRef<C, R>,
) {
    let (Some(service), Some(dropdown)) = (service.upgrade(), dropdown.upgrade()) else {
        return;
    };
    if service.stack.is_topmost(dropdown.id()) {
        dropdown.close(None);
    }
}

/// Placement requested from the host.
fn position_for(
    origin: Option<&dyn SurfaceElement>,
    x_offset: Option<f64>,
    y_offset: Option<f64>,
) -> PositionStrategy {
    match origin {
        Some(origin) => PositionStrategy::Anchored {
            origin: origin.node_id(),
            offset_x: x_offset.unwrap_or(0.0),
            offset_y: y_offset.unwrap_or(0.0),
        },
        None if x_offset.is_some() || y_offset.is_some() => PositionStrategy::Offset {
            left: x_offset.unwrap_or(0.0),
            top: y_offset.unwrap_or(0.0),
        },
        None => PositionStrategy::Centered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_origin_no_offsets_centers() {
        assert_eq!(position_for(None, None, None), PositionStrategy::Centered);
    }

    #[test]
    fn a_single_offset_pins_to_viewport_coordinates() {
        assert_eq!(
            position_for(None, None, Some(40.0)),
            PositionStrategy::Offset { left: 0.0, top: 40.0 }
        );
    }
}
