#![forbid(unsafe_code)]

//! Bottom sheet configuration.

use std::time::Duration;

use super::animation::SheetAnimator;
use super::snap::{
    DEFAULT_DISMISS_THRESHOLD, DEFAULT_SNAP_POINTS, DEFAULT_VELOCITY_THRESHOLD, SnapPoint,
};
use crate::portal::{PortalConfig, portal_builders};

/// Data-free sheet behavior.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SheetBehavior {
    pub snap_points: Vec<SnapPoint>,
    /// Index into `snap_points` as declared, not as sorted.
    pub initial_snap_point: usize,
    /// Look for a `.bottom-sheet-drag-handle` child; otherwise the whole
    /// surface is the handle.
    pub drag_handle: bool,
    pub enable_drag: bool,
    pub dismiss_on_swipe_down: bool,
    /// Fraction of the viewport below which a released sheet dismisses.
    pub dismiss_threshold: f64,
    /// Release velocity (px/ms) that counts as a fling.
    pub swipe_velocity_threshold: f64,
    pub animation: bool,
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub animation_duration: Duration,
}

impl Default for SheetBehavior {
    fn default() -> Self {
        Self {
            snap_points: DEFAULT_SNAP_POINTS.map(SnapPoint::Number).to_vec(),
            initial_snap_point: 0,
            drag_handle: true,
            enable_drag: true,
            dismiss_on_swipe_down: true,
            dismiss_threshold: DEFAULT_DISMISS_THRESHOLD,
            swipe_velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            animation: true,
            animation_duration: SheetAnimator::default_duration(),
        }
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Everything [`BottomSheet::open`](super::BottomSheet::open) accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct BottomSheetConfig<D = ()> {
    pub base: PortalConfig<D>,
    pub behavior: SheetBehavior,
}

impl<D> Default for BottomSheetConfig<D> {
    fn default() -> Self {
        Self {
            base: PortalConfig::default(),
            behavior: SheetBehavior::default(),
        }
    }
}

portal_builders!(BottomSheetConfig);

impl<D> BottomSheetConfig<D> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn behavior(mut self, behavior: SheetBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    #[must_use]
    pub fn snap_points<I, P>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SnapPoint>,
    {
        self.behavior.snap_points = points.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn initial_snap_point(mut self, index: usize) -> Self {
        self.behavior.initial_snap_point = index;
        self
    }

    #[must_use]
    pub fn drag_handle(mut self, search: bool) -> Self {
        self.behavior.drag_handle = search;
        self
    }

    #[must_use]
    pub fn enable_drag(mut self, enabled: bool) -> Self {
        self.behavior.enable_drag = enabled;
        self
    }

    #[must_use]
    pub fn dismiss_on_swipe_down(mut self, enabled: bool) -> Self {
        self.behavior.dismiss_on_swipe_down = enabled;
        self
    }

    #[must_use]
    pub fn dismiss_threshold(mut self, fraction: f64) -> Self {
        self.behavior.dismiss_threshold = fraction;
        self
    }

    #[must_use]
    pub fn swipe_velocity_threshold(mut self, px_per_ms: f64) -> Self {
        self.behavior.swipe_velocity_threshold = px_per_ms;
        self
    }

    #[must_use]
    pub fn animation(mut self, enabled: bool) -> Self {
        self.behavior.animation = enabled;
        self
    }

    #[must_use]
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.behavior.animation_duration = duration;
        self
    }
}
