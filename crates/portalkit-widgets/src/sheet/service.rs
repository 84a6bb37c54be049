#![forbid(unsafe_code)]

//! The bottom sheet service.
//!
//! [`BottomSheet::open`] wires one sheet together:
//!
//! 1. Create the overlay, register it on the stack, apply its z-index band.
//! 2. Lock body scroll if it is the first sheet; set ARIA attributes.
//! 3. Mount the component.
//! 4. Parse snap points against the viewport and resolve the initial one.
//! 5. Pin the surface to the bottom edge, off-screen.
//! 6. Create the focus trap, attach drag tracking, subscribe to backdrop
//!    clicks, Escape and detachment.
//! 7. Run the opening transition and slide to the initial snap point.
//!
//! Per-sheet data lives in a side table keyed by the sheet id and is removed
//! when the overlay detaches. Callbacks registered on the sheet's nodes hold
//! only weak references, so a sheet that is never closed does not keep the
//! service alive.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use ahash::AHashMap;
use portalkit_a11y::{Accessibility, AriaRole, FocusTrap};
use portalkit_core::dom::{Document, SurfaceElement};
use portalkit_core::drag_lock::DragStyleLock;
use portalkit_core::event::NodeId;
use portalkit_core::time::Clock;
use portalkit_runtime::{ReadOnlyObservable, Scheduler, Subscription, TimerId};

use super::animation::SheetAnimator;
use super::config::{BottomSheetConfig, SheetBehavior};
use super::gesture::{GestureCallbacks, GestureTracker, SwipeDirection, is_swipe};
use super::sheet_ref::{BottomSheetRef, SheetHandle, WeakSheetRef};
use super::snap::{
    DEFAULT_SNAP_POINTS, ParsedSnapPoint, SnapPoint, calculate_sheet_position,
    determine_target_snap_point, initial_snap_point, parse_snap_points, validate_snap_points,
};
use crate::overlay::{OverlayConfig, OverlayHandle, OverlayHost, PositionStrategy};
use crate::portal::PortalConfig;
use crate::stack::{StackManager, generate_id};

/// Class of the optional drag handle inside a sheet.
pub const DRAG_HANDLE_CLASS: &str = "bottom-sheet-drag-handle";

const BACKDROP_CLASS: &str = "bottom-sheet-backdrop";
const CONTAINER_CLASS: &str = "bottom-sheet-container";
const ID_PREFIX: &str = "bottom-sheet";

/// What the mount closure receives.
pub struct SheetContext<D, C, R> {
    /// Node the component renders into.
    pub surface: Rc<dyn SurfaceElement>,
    /// The configured payload.
    pub data: Option<D>,
    /// Handle of the sheet being opened.
    pub sheet: BottomSheetRef<C, R>,
}

impl<D: fmt::Debug, C, R> fmt::Debug for SheetContext<D, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetContext")
            .field("data", &self.data)
            .field("sheet", &self.sheet)
            .finish_non_exhaustive()
    }
}

struct SheetRecord {
    snap_points: Rc<[ParsedSnapPoint]>,
    /// Current `translateY` of the surface.
    transform: Rc<Cell<f64>>,
    /// Timer ending the snap transition in flight.
    snap_timer: Rc<Cell<Option<TimerId>>>,
    focus_trap: Option<Box<dyn FocusTrap>>,
    subscriptions: Vec<Subscription>,
    previously_focused: Option<NodeId>,
}

struct ServiceInner {
    host: Rc<dyn OverlayHost>,
    document: Rc<dyn Document>,
    a11y: Rc<dyn Accessibility>,
    stack: StackManager<Rc<dyn SheetHandle>>,
    gestures: GestureTracker,
    animator: SheetAnimator,
    sheets: RefCell<AHashMap<String, SheetRecord>>,
}

/// Opens and tracks bottom sheets. Clones share the same stack.
#[derive(Clone)]
pub struct BottomSheet {
    inner: Rc<ServiceInner>,
}

impl fmt::Debug for BottomSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BottomSheet")
            .field("stack", &self.inner.stack)
            .field("gestures", &self.inner.gestures)
            .finish_non_exhaustive()
    }
}

impl BottomSheet {
    pub fn new(
        host: Rc<dyn OverlayHost>,
        document: Rc<dyn Document>,
        a11y: Rc<dyn Accessibility>,
        scheduler: Rc<dyn Scheduler>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let lock = DragStyleLock::new(document.body());
        Self {
            inner: Rc::new(ServiceInner {
                host,
                document,
                a11y,
                stack: StackManager::new(),
                gestures: GestureTracker::new(clock, lock),
                animator: SheetAnimator::new(scheduler),
                sheets: RefCell::new(AHashMap::new()),
            }),
        }
    }

    /// Open a sheet, mounting the component built by `mount`.
    pub fn open<C, D, R>(
        &self,
        config: BottomSheetConfig<D>,
        mount: impl FnOnce(SheetContext<D, C, R>) -> C,
    ) -> BottomSheetRef<C, R>
    where
        C: 'static,
        R: 'static,
    {
        let inner = &self.inner;
        let BottomSheetConfig { base, behavior } = config;
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
            panel_classes: std::iter::once(CONTAINER_CLASS.to_owned())
                .chain(panel_class)
                .collect(),
            width: "100%".to_owned(),
            height: None,
            max_width: "100vw".to_owned(),
            position: PositionStrategy::BottomEdge,
        });
        let surface = overlay.surface();

        let sheet: BottomSheetRef<C, R> = BottomSheetRef::new(
            id.clone(),
            Rc::clone(&overlay),
            inner.animator.clone(),
            behavior.animation,
            behavior.animation_duration,
        );
        let level = inner.stack.add_to_stack(Rc::new(sheet.clone()));
        sheet.set_level(level);
        inner.stack.set_z_index(&*overlay, level);
        if inner.stack.size() == 1 {
            inner.a11y.disable_body_scroll();
        }
        inner
            .a11y
            .set_aria_attributes(&*surface, &aria, AriaRole::Dialog);

        let component = mount(SheetContext {
            surface: Rc::clone(&surface),
            data,
            sheet: sheet.clone(),
        });
        sheet.attach_component(component);

        let viewport = inner.document.viewport_height();
        let snap_points = resolve_snap_points(&id, &behavior.snap_points, viewport);
        let initial = initial_snap_point(&snap_points, behavior.initial_snap_point).cloned();
        if let Some(point) = &initial {
            sheet.update_snap_point(point.index);
        }

        pin_to_bottom(&*surface, viewport);

        let previously_focused = inner.a11y.active_element();
        let focus_trap = focus_trap.then(|| inner.a11y.create_focus_trap(Rc::clone(&surface), true));
        let transform = Rc::new(Cell::new(viewport));
        let snap_timer = Rc::new(Cell::new(None));
        inner.sheets.borrow_mut().insert(
            id.clone(),
            SheetRecord {
                snap_points: Rc::clone(&snap_points),
                transform: Rc::clone(&transform),
                snap_timer: Rc::clone(&snap_timer),
                focus_trap,
                subscriptions: Vec::new(),
                previously_focused,
            },
        );

        if behavior.enable_drag {
            let handle = if behavior.drag_handle {
                surface
                    .query_class(DRAG_HANDLE_CLASS)
                    .unwrap_or_else(|| Rc::clone(&surface))
            } else {
                Rc::clone(&surface)
            };
            self.attach_gestures(
                &sheet,
                handle,
                &behavior,
                snap_points,
                Rc::clone(&transform),
                Rc::clone(&snap_timer),
            );
        }

        let subscriptions = self.subscribe_overlay(&sheet, &*overlay, has_backdrop, disable_close);
        if let Some(record) = inner.sheets.borrow_mut().get_mut(&id) {
            record.subscriptions = subscriptions;
        }

        let opening = inner.animator.apply_opening(
            &*overlay,
            behavior.animation,
            behavior.animation_duration,
        );
        sheet.set_opening_timer(opening);

        if let Some(point) = &initial {
            let position = calculate_sheet_position(point, surface.offset_height());
            transform.set(position);
            if behavior.animation {
                inner.animate_snap(&*overlay, position, behavior.animation_duration, &snap_timer);
            } else {
                surface.set_translate_y(position);
            }
        }

        tracing::debug!(
            sheet = %id,
            level,
            snap_index = sheet.current_snap_point_index(),
            "bottom sheet opened"
        );
        sheet
    }

    /// Close every open sheet, topmost first.
    pub fn dismiss_all(&self) {
        self.inner.stack.close_all();
    }

    /// Live number of open sheets.
    pub fn open_count(&self) -> ReadOnlyObservable<usize> {
        self.inner.stack.open_count()
    }

    /// Open sheets, bottom-most first.
    pub fn open_bottom_sheets(&self) -> Vec<Rc<dyn SheetHandle>> {
        self.inner.stack.get_all()
    }

    pub fn is_topmost(&self, id: &str) -> bool {
        self.inner.stack.is_topmost(id)
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        self.inner.gestures.is_dragging(id)
    }

    /// Move an open sheet to the snap point declared at `original_index`.
    ///
    /// Returns `false` for closing or unknown sheets and out-of-range indices.
    pub fn snap_to(&self, sheet: &dyn SheetHandle, original_index: usize) -> bool {
        if sheet.is_closing() {
            return false;
        }
        let (target, transform, snap_timer) = {
            let sheets = self.inner.sheets.borrow();
            let Some(record) = sheets.get(sheet.id()) else {
                return false;
            };
            let Some(target) = record
                .snap_points
                .iter()
                .find(|p| p.index == original_index)
                .cloned()
            else {
                return false;
            };
            (
                target,
                Rc::clone(&record.transform),
                Rc::clone(&record.snap_timer),
            )
        };
        let overlay = sheet.overlay();
        let surface = overlay.surface();
        let position = calculate_sheet_position(&target, surface.offset_height());
        transform.set(position);
        sheet.update_snap_point(target.index);
        if sheet.animation_enabled() {
            self.inner
                .animate_snap(&*overlay, position, sheet.animation_duration(), &snap_timer);
        } else {
            surface.set_translate_y(position);
        }
        tracing::debug!(sheet = sheet.id(), index = target.index, "snapped programmatically");
        true
    }

    fn attach_gestures<C: 'static, R: 'static>(
        &self,
        sheet: &BottomSheetRef<C, R>,
        handle: Rc<dyn SurfaceElement>,
        behavior: &SheetBehavior,
        snap_points: Rc<[ParsedSnapPoint]>,
        transform: Rc<Cell<f64>>,
        snap_timer: Rc<Cell<Option<TimerId>>>,
    ) {
        let baseline = Rc::new(Cell::new(0.0));
        let service = Rc::downgrade(&self.inner);
        let weak_sheet = sheet.downgrade();

        let on_start = {
            let baseline = Rc::clone(&baseline);
            let transform = Rc::clone(&transform);
            let weak_sheet = weak_sheet.clone();
            Rc::new(move || {
                if weak_sheet.upgrade().is_some_and(|sheet| !sheet.is_closing()) {
                    baseline.set(transform.get());
                }
            }) as Rc<dyn Fn()>
        };

        let on_move = {
            let service = Weak::clone(&service);
            let weak_sheet = weak_sheet.clone();
            let transform = Rc::clone(&transform);
            Rc::new(move |delta: f64, _y: f64| {
                let (Some(service), Some(sheet)) = (service.upgrade(), weak_sheet.upgrade()) else {
                    return;
                };
                if sheet.is_closing() {
                    return;
                }
                let position = (baseline.get() + delta).max(0.0);
                transform.set(position);
                service
                    .animator
                    .update_drag_position(&*sheet.overlay(), position);
            }) as Rc<dyn Fn(f64, f64)>
        };

        let release = DragRelease {
            service,
            sheet: weak_sheet,
            snap_points,
            transform,
            snap_timer,
            dismiss_on_swipe_down: behavior.dismiss_on_swipe_down,
            dismiss_threshold: behavior.dismiss_threshold,
            velocity_threshold: behavior.swipe_velocity_threshold,
        };
        let on_end = Rc::new(move |velocity: f64, _delta: f64| release.settle(velocity))
            as Rc<dyn Fn(f64, f64)>;

        self.inner.gestures.enable_gestures(
            sheet.id(),
            handle,
            GestureCallbacks {
                on_start: Some(on_start),
                on_move: Some(on_move),
                on_end: Some(on_end),
            },
        );
    }

    fn subscribe_overlay<C: 'static, R: 'static>(
        &self,
        sheet: &BottomSheetRef<C, R>,
        overlay: &dyn OverlayHandle,
        has_backdrop: bool,
        disable_close: bool,
    ) -> Vec<Subscription> {
        let mut subscriptions = Vec::with_capacity(3);

        if has_backdrop && !disable_close {
            let service = Rc::downgrade(&self.inner);
            let weak_sheet = sheet.downgrade();
            subscriptions.push(overlay.backdrop_click().subscribe(move |_| {
                dismiss_if_topmost(&service, &weak_sheet);
            }));
        }

        if !disable_close {
            let service = Rc::downgrade(&self.inner);
            let weak_sheet = sheet.downgrade();
            subscriptions.push(overlay.keydown().subscribe(move |key| {
                if key.is_escape() {
                    dismiss_if_topmost(&service, &weak_sheet);
                }
            }));
        }

        let service = Rc::downgrade(&self.inner);
        let id = sheet.id().to_owned();
        subscriptions.push(overlay.detachments().subscribe(move |_| {
            if let Some(service) = service.upgrade() {
                service.cleanup(&id);
            }
        }));

        subscriptions
    }
}

impl ServiceInner {
    /// Tear down everything `open` registered for `id`.
    fn cleanup(&self, id: &str) {
        self.stack.remove_from_stack(id);
        self.gestures.disable_gestures(id);
        let record = self.sheets.borrow_mut().remove(id);
        let Some(mut record) = record else {
            return;
        };
        if let Some(timer) = record.snap_timer.take() {
            self.animator.cancel(timer);
        }
        if let Some(trap) = record.focus_trap.as_mut() {
            trap.destroy();
        }
        if self.stack.is_empty() {
            self.a11y.enable_body_scroll();
            self.a11y.restore_focus(record.previously_focused);
        }
        tracing::debug!(sheet = id, remaining = self.stack.size(), "bottom sheet detached");
        drop(record);
    }

    /// Start a snap transition, cancelling the one still in flight.
    fn animate_snap(
        &self,
        overlay: &dyn OverlayHandle,
        position: f64,
        duration: Duration,
        pending: &Cell<Option<TimerId>>,
    ) {
        if let Some(timer) = pending.take() {
            self.animator.cancel(timer);
        }
        pending.set(Some(self.animator.apply_snap(overlay, position, duration)));
    }
}

fn dismiss_if_topmost<C: 'static, R: 'static>(
    service: &Weak<ServiceInner>,
    sheet: &WeakSheetRef<C, R>,
) {
    let (Some(service), Some(sheet)) = (service.upgrade(), sheet.upgrade()) else {
        return;
    };
    if service.stack.is_topmost(sheet.id()) {
        sheet.dismiss();
    }
}

/// Parse the declared snap points, falling back to the defaults when the
/// declaration is invalid.
fn resolve_snap_points(id: &str, declared: &[SnapPoint], viewport: f64) -> Rc<[ParsedSnapPoint]> {
    let fallback;
    let points = if validate_snap_points(declared) {
        declared
    } else {
        tracing::warn!(
            sheet = id,
            declared = ?declared,
            "Invalid snap points, using defaults: [0.5, 1.0]"
        );
        fallback = DEFAULT_SNAP_POINTS.map(SnapPoint::Number);
        &fallback[..]
    };
    parse_snap_points(points, viewport, viewport).into()
}

/// Fix the surface to the bottom edge and park it below the viewport.
fn pin_to_bottom(surface: &dyn SurfaceElement, viewport: f64) {
    for (property, value) in [
        ("position", "fixed"),
        ("bottom", "0"),
        ("top", "auto"),
        ("left", "0"),
        ("right", "0"),
        ("margin", "0"),
        ("max-height", "90vh"),
        ("width", "100%"),
    ] {
        surface.set_style(property, value);
    }
    surface.set_translate_y(viewport);
}

/// Decides where a released sheet goes.
struct DragRelease<C, R> {
    service: Weak<ServiceInner>,
    sheet: WeakSheetRef<C, R>,
    snap_points: Rc<[ParsedSnapPoint]>,
    transform: Rc<Cell<f64>>,
    snap_timer: Rc<Cell<Option<TimerId>>>,
    dismiss_on_swipe_down: bool,
    dismiss_threshold: f64,
    velocity_threshold: f64,
}

impl<C: 'static, R: 'static> DragRelease<C, R> {
    fn settle(&self, velocity: f64) {
        let (Some(service), Some(sheet)) = (self.service.upgrade(), self.sheet.upgrade()) else {
            return;
        };
        if sheet.is_closing() {
            tracing::debug!(sheet = sheet.id(), "released while closing; ignored");
            return;
        }
        let overlay = sheet.overlay();
        let surface = overlay.surface();
        let viewport = service.document.viewport_height();
        let visible = surface.bounding_rect().visible_height_in(viewport);

        if self.dismiss_on_swipe_down {
            if visible < viewport * self.dismiss_threshold {
                tracing::debug!(sheet = sheet.id(), visible, "released below dismiss threshold");
                sheet.dismiss();
                return;
            }
            let swipe = is_swipe(velocity, self.velocity_threshold);
            let below_lowest = self
                .snap_points
                .first()
                .is_some_and(|lowest| visible < lowest.value);
            if swipe.direction == Some(SwipeDirection::Down) && swipe.is_swipe && below_lowest {
                tracing::debug!(sheet = sheet.id(), velocity, "flung below lowest snap point");
                sheet.dismiss();
                return;
            }
        }

        let Some(target) = determine_target_snap_point(
            visible,
            velocity,
            &self.snap_points,
            self.velocity_threshold,
        ) else {
            tracing::debug!(sheet = sheet.id(), velocity, "no snap point below; dismissing");
            sheet.dismiss();
            return;
        };
        let position = calculate_sheet_position(target, surface.offset_height());
        self.transform.set(position);
        sheet.update_snap_point(target.index);
        tracing::debug!(
            sheet = sheet.id(),
            index = target.index,
            position,
            "settling on snap point"
        );
        service.animate_snap(&*overlay, position, sheet.animation_duration(), &self.snap_timer);
    }
}
