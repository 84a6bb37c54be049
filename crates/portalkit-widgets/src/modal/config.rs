#![forbid(unsafe_code)]

//! Modal configuration.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use portalkit_a11y::AriaRole;

use crate::guard::{CloseGuard, GuardError};
use crate::portal::{PortalConfig, portal_builders};
use crate::transition::TransitionStyle;

/// Everything [`Modal::open`](super::Modal::open) accepts.
#[derive(Clone)]
pub struct ModalConfig<D = ()> {
    pub base: PortalConfig<D>,
    /// CSS width of the surface.
    pub width: String,
    /// CSS height of the surface; `None` sizes to content.
    pub height: Option<String>,
    pub role: AriaRole,
    pub animation: bool,
    pub animation_duration: Duration,
    /// Guard installed on the modal as it opens.
    pub before_close: Option<CloseGuard>,
}

impl<D: fmt::Debug> fmt::Debug for ModalConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalConfig")
            .field("base", &self.base)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("role", &self.role)
            .field("animation", &self.animation)
            .field("animation_duration", &self.animation_duration)
            .field("before_close", &self.before_close.is_some())
            .finish()
    }
}

impl<D> Default for ModalConfig<D> {
    fn default() -> Self {
        Self {
            base: PortalConfig::default(),
            width: "500px".to_owned(),
            height: None,
            role: AriaRole::Dialog,
            animation: true,
            animation_duration: TransitionStyle::MODAL.default_duration,
            before_close: None,
        }
    }
}

portal_builders!(ModalConfig);

impl<D> ModalConfig<D> {
    pub fn new() -> Self {
        Self::default()
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
    pub fn role(mut self, role: AriaRole) -> Self {
        self.role = role;
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

    #[must_use]
    pub fn before_close(mut self, guard: impl Fn() -> Result<bool, GuardError> + 'static) -> Self {
        self.before_close = Some(Rc::new(guard));
        self
    }
}
