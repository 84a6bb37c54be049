#![forbid(unsafe_code)]

//! Animation coordinator for bottom sheets.
//!
//! Transitions are CSS-driven. This module only sequences state classes,
//! the duration custom property and the `transform`, using the
//! [`Scheduler`] to know when a transition has run its course.
//!
//! | Transition | Surface | Backdrop |
//! |------------|---------|----------|
//! | open | `opening` → `opened` | `opening` → `opened` |
//! | close | `closing` → `closed` | `closing` → `closed` |
//! | snap | `snapping` until done | untouched |
//! | drag | `dragging`, instant transform | untouched |

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use portalkit_core::classes::{ANIMATION_DURATION_VAR, SheetClasses, SurfacePart};
use portalkit_core::dom::SurfaceElement;
use portalkit_runtime::{Scheduler, TimerId};

use crate::overlay::OverlayHandle;

const DEFAULT_DURATION: Duration = Duration::from_millis(300);

/// Drives sheet visual transitions.
#[derive(Clone)]
pub struct SheetAnimator {
    scheduler: Rc<dyn Scheduler>,
}

impl fmt::Debug for SheetAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetAnimator").finish_non_exhaustive()
    }
}

struct Parts {
    surface: Rc<dyn SurfaceElement>,
    backdrop: Option<Rc<dyn SurfaceElement>>,
}

impl Parts {
    fn of(overlay: &dyn OverlayHandle) -> Self {
        Self {
            surface: overlay.surface(),
            backdrop: overlay.backdrop(),
        }
    }

    fn add(&self, states: SheetClasses) {
        states.apply_to(&*self.surface, SurfacePart::Surface);
        if let Some(backdrop) = &self.backdrop {
            states.apply_to(&**backdrop, SurfacePart::Backdrop);
        }
    }

    fn remove(&self, states: SheetClasses) {
        states.strip_from(&*self.surface, SurfacePart::Surface);
        if let Some(backdrop) = &self.backdrop {
            states.strip_from(&**backdrop, SurfacePart::Backdrop);
        }
    }

    fn set_duration(&self, duration: Duration) {
        let value = format!("{}ms", duration.as_millis());
        self.surface.set_style(ANIMATION_DURATION_VAR, &value);
        if let Some(backdrop) = &self.backdrop {
            backdrop.set_style(ANIMATION_DURATION_VAR, &value);
        }
    }
}

impl SheetAnimator {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    pub const fn default_duration() -> Duration {
        DEFAULT_DURATION
    }

    /// Start the opening transition.
    ///
    /// Returns the pending timer so a close can cancel it; `None` when
    /// animation is disabled and the sheet jumped straight to opened.
    pub fn apply_opening(
        &self,
        overlay: &dyn OverlayHandle,
        enabled: bool,
        duration: Duration,
    ) -> Option<TimerId> {
        let parts = Parts::of(overlay);
        if !enabled {
            parts.remove(SheetClasses::OPENING);
            parts.add(SheetClasses::OPENED);
            return None;
        }
        parts.set_duration(duration);
        parts.add(SheetClasses::OPENING);
        Some(self.scheduler.set_timeout(
            duration,
            Box::new(move || {
                parts.remove(SheetClasses::OPENING);
                parts.add(SheetClasses::OPENED);
            }),
        ))
    }

    /// Start the closing transition and run `on_complete` when it ends.
    ///
    /// With animation disabled `on_complete` runs before this returns.
    pub fn apply_closing(
        &self,
        overlay: &dyn OverlayHandle,
        enabled: bool,
        duration: Duration,
        on_complete: Box<dyn FnOnce()>,
    ) -> Option<TimerId> {
        if !enabled {
            on_complete();
            return None;
        }
        let parts = Parts::of(overlay);
        parts.set_duration(duration);
        parts.remove(SheetClasses::OPENING | SheetClasses::OPENED);
        parts.add(SheetClasses::CLOSING);
        Some(self.scheduler.set_timeout(
            duration,
            Box::new(move || {
                parts.remove(SheetClasses::CLOSING);
                parts.add(SheetClasses::CLOSED);
                on_complete();
            }),
        ))
    }

    /// Animate the surface to `target` px of vertical translation.
    pub fn apply_snap(&self, overlay: &dyn OverlayHandle, target: f64, duration: Duration) -> TimerId {
        let parts = Parts::of(overlay);
        let surface = Rc::clone(&parts.surface);
        SheetClasses::DRAGGING.strip_from(&*surface, SurfacePart::Surface);
        SheetClasses::SNAPPING.apply_to(&*surface, SurfacePart::Surface);
        parts.set_duration(duration);
        // Flush layout so the transform change transitions from the current position.
        let _ = surface.offset_height();
        surface.set_translate_y(target);
        self.scheduler.set_timeout(
            duration,
            Box::new(move || {
                SheetClasses::SNAPPING.strip_from(&*surface, SurfacePart::Surface);
            }),
        )
    }

    /// Follow the pointer with no transition.
    pub fn update_drag_position(&self, overlay: &dyn OverlayHandle, position: f64) {
        let surface = overlay.surface();
        if !SheetClasses::read_from(&*surface, SurfacePart::Surface).contains(SheetClasses::DRAGGING) {
            SheetClasses::DRAGGING.apply_to(&*surface, SurfacePart::Surface);
        }
        surface.set_translate_y(position);
    }

    /// Drop every visual state, the transform and any inline transition.
    pub fn reset(&self, overlay: &dyn OverlayHandle) {
        let parts = Parts::of(overlay);
        parts.remove(SheetClasses::all());
        parts.surface.remove_style("transform");
        parts.surface.remove_style("transition");
    }

    pub fn cancel(&self, timer: TimerId) -> bool {
        self.scheduler.clear_timeout(timer)
    }
}
