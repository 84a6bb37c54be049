#![forbid(unsafe_code)]

//! Open and close transitions for centered overlays (modals, drop-downs).
//!
//! Same sequencing as the sheet animator without snapping or dragging.
//! Class names are built from a per-kind prefix: `modal-opening` on the
//! surface, `modal-backdrop-opening` on the backdrop.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use portalkit_core::dom::SurfaceElement;
use portalkit_runtime::{Scheduler, TimerId};

use crate::overlay::OverlayHandle;

/// Naming and defaults of one overlay kind's transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStyle {
    /// Class prefix, e.g. `"modal"`.
    pub prefix: &'static str,
    /// CSS custom property carrying the duration.
    pub duration_var: &'static str,
    pub default_duration: Duration,
    /// Make the surface visible as it opens. Drop-down surfaces start hidden.
    pub reveal: bool,
}

impl TransitionStyle {
    pub const MODAL: Self = Self {
        prefix: "modal",
        duration_var: "--modal-animation-duration",
        default_duration: Duration::from_millis(300),
        reveal: false,
    };

    pub const DROPDOWN: Self = Self {
        prefix: "dropdown",
        duration_var: "--dropdown-animation-duration",
        default_duration: Duration::from_millis(200),
        reveal: true,
    };

    /// Surface class for `phase`.
    pub fn surface_class(self, phase: Phase) -> String {
        format!("{}-{}", self.prefix, phase.as_str())
    }

    /// Backdrop class for `phase`.
    pub fn backdrop_class(self, phase: Phase) -> String {
        format!("{}-backdrop-{}", self.prefix, phase.as_str())
    }
}

/// Where an overlay is in its open/close transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Opened,
    Closing,
    Closed,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Opened => "opened",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

struct Parts {
    style: TransitionStyle,
    surface: Rc<dyn SurfaceElement>,
    backdrop: Option<Rc<dyn SurfaceElement>>,
}

impl Parts {
    fn of(style: TransitionStyle, overlay: &dyn OverlayHandle) -> Self {
        Self {
            style,
            surface: overlay.surface(),
            backdrop: overlay.backdrop(),
        }
    }

    fn add(&self, phase: Phase) {
        self.surface.add_class(&self.style.surface_class(phase));
        if let Some(backdrop) = &self.backdrop {
            backdrop.add_class(&self.style.backdrop_class(phase));
        }
    }

    fn remove(&self, phase: Phase) {
        self.surface.remove_class(&self.style.surface_class(phase));
        if let Some(backdrop) = &self.backdrop {
            backdrop.remove_class(&self.style.backdrop_class(phase));
        }
    }

    fn set_duration(&self, duration: Duration) {
        let value = format!("{}ms", duration.as_millis());
        self.surface.set_style(self.style.duration_var, &value);
        if let Some(backdrop) = &self.backdrop {
            backdrop.set_style(self.style.duration_var, &value);
        }
    }
}

/// Drives the open/close classes of one overlay kind.
#[derive(Clone)]
pub struct PortalAnimator {
    scheduler: Rc<dyn Scheduler>,
    style: TransitionStyle,
}

impl fmt::Debug for PortalAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalAnimator")
            .field("prefix", &self.style.prefix)
            .finish_non_exhaustive()
    }
}

impl PortalAnimator {
    pub fn new(scheduler: Rc<dyn Scheduler>, style: TransitionStyle) -> Self {
        Self { scheduler, style }
    }

    pub fn style(&self) -> TransitionStyle {
        self.style
    }

    pub fn default_duration(&self) -> Duration {
        self.style.default_duration
    }

    /// Start the opening transition. `None` when animation is disabled and
    /// the overlay jumped straight to opened.
    pub fn apply_opening(
        &self,
        overlay: &dyn OverlayHandle,
        enabled: bool,
        duration: Duration,
    ) -> Option<TimerId> {
        let parts = Parts::of(self.style, overlay);
        if self.style.reveal {
            parts.surface.set_style("visibility", "visible");
        }
        if !enabled {
            if self.style.reveal {
                parts.surface.set_style("opacity", "1");
            }
            parts.add(Phase::Opened);
            return None;
        }
        if self.style.reveal {
            parts.surface.remove_style("opacity");
        }
        parts.set_duration(duration);
        parts.add(Phase::Opening);
        Some(self.scheduler.set_timeout(
            duration,
            Box::new(move || {
                parts.remove(Phase::Opening);
                parts.add(Phase::Opened);
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
        let parts = Parts::of(self.style, overlay);
        parts.set_duration(duration);
        parts.remove(Phase::Opening);
        parts.remove(Phase::Opened);
        parts.add(Phase::Closing);
        Some(self.scheduler.set_timeout(
            duration,
            Box::new(move || {
                parts.remove(Phase::Closing);
                parts.add(Phase::Closed);
                on_complete();
            }),
        ))
    }

    pub fn cancel(&self, timer: TimerId) -> bool {
        self.scheduler.clear_timeout(timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_follow_prefix() {
        let modal = TransitionStyle::MODAL;
        assert_eq!(modal.surface_class(Phase::Opening), "modal-opening");
        assert_eq!(modal.backdrop_class(Phase::Closed), "modal-backdrop-closed");
        let dropdown = TransitionStyle::DROPDOWN;
        assert_eq!(dropdown.surface_class(Phase::Opened), "dropdown-opened");
        assert_eq!(dropdown.backdrop_class(Phase::Closing), "dropdown-backdrop-closing");
    }

    #[test]
    fn defaults_per_kind() {
        assert_eq!(TransitionStyle::MODAL.default_duration, Duration::from_millis(300));
        assert_eq!(TransitionStyle::DROPDOWN.default_duration, Duration::from_millis(200));
        assert!(TransitionStyle::DROPDOWN.reveal && !TransitionStyle::MODAL.reveal);
    }
}
