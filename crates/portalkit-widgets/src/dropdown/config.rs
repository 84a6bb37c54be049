#![forbid(unsafe_code)]

//! Drop-down configuration.

use std::time::Duration;

use crate::portal::{PortalConfig, portal_builders};
use crate::transition::TransitionStyle;

/// Everything [`DropDown::open`](super::DropDown::open) accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct DropDownConfig<D = ()> {
    pub base: PortalConfig<D>,
    /// Horizontal offset from the origin, or the left edge without one.
    pub x_offset: Option<f64>,
    /// Vertical offset from the origin, or the top edge without one.
    pub y_offset: Option<f64>,
    /// Close on a click on the backdrop.
    pub auto_close_on_click_outside: bool,
    pub auto_close_on_escape: bool,
    /// CSS width of the surface.
    pub width: String,
    /// CSS height of the surface; `None` sizes to content.
    pub height: Option<String>,
    pub animation: bool,
    pub animation_duration: Duration,
}

impl<D> Default for DropDownConfig<D> {
    fn default() -> Self {
        Self {
            base: PortalConfig::default(),
            x_offset: None,
            y_offset: None,
            auto_close_on_click_outside: true,
            auto_close_on_escape: true,
            width: "500px".to_owned(),
            height: None,
            animation: true,
            animation_duration: TransitionStyle::DROPDOWN.default_duration,
        }
    }
}

portal_builders!(DropDownConfig);

impl<D> DropDownConfig<D> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn offset(mut self, x: f64, y: f64) -> Self {
        self.x_offset = Some(x);
        self.y_offset = Some(y);
        self
    }

    #[must_use]
    pub fn x_offset(mut self, x: f64) -> Self {
        self.x_offset = Some(x);
        self
    }

    #[must_use]
    pub fn y_offset(mut self, y: f64) -> Self {
        self.y_offset = Some(y);
        self
    }

    #[must_use]
    pub fn auto_close_on_click_outside(mut self, enabled: bool) -> Self {
        self.auto_close_on_click_outside = enabled;
        self
    }

    #[must_use]
    pub fn auto_close_on_escape(mut self, enabled: bool) -> Self {
        self.auto_close_on_escape = enabled;
        self
    }

    #[must_use]
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = width.into();
        self
    }

    #[must_use]
    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }

    #[must_use]
    pub fn animation(mut self, enabled: bool) -> Self {
        self.animation = enabled;
        self
    }

    #[must_use]
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: DropDownConfig = DropDownConfig::new();
        assert!(config.auto_close_on_click_outside && config.auto_close_on_escape);
        assert_eq!(config.x_offset, None);
        assert_eq!(config.y_offset, None);
        assert_eq!(config.width, "500px");
        assert_eq!(config.animation_duration, Duration::from_millis(200));
        assert!(config.base.has_backdrop);
    }

    #[test]
    fn offset_sets_both_axes() {
        let config: DropDownConfig = DropDownConfig::new().offset(8.0, 4.0).has_backdrop(false);
        assert_eq!((config.x_offset, config.y_offset), (Some(8.0), Some(4.0)));
        assert!(!config.base.has_backdrop);
    }
}
