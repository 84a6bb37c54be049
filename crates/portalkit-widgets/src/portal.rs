#![forbid(unsafe_code)]

//! Options every overlay kind accepts.

use portalkit_a11y::AriaAttributes;

/// Options shared by every overlay kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig<D = ()> {
    /// Payload handed to the mounted component.
    pub data: Option<D>,
    pub has_backdrop: bool,
    /// Overrides the overlay kind's default backdrop class.
    pub backdrop_class: Option<String>,
    /// Ignore backdrop clicks and Escape.
    pub disable_close: bool,
    /// Extra classes for the surface.
    pub panel_class: Vec<String>,
    pub aria: AriaAttributes,
    pub focus_trap: bool,
}

impl<D> Default for PortalConfig<D> {
    fn default() -> Self {
        Self {
            data: None,
            has_backdrop: true,
            backdrop_class: None,
            disable_close: false,
            panel_class: Vec::new(),
            aria: AriaAttributes::default(),
            focus_trap: true,
        }
    }
}

/// Builder methods for the [`PortalConfig`] held in a config's `base` field.
macro_rules! portal_builders {
    ($config:ident) => {
        impl<D> $config<D> {
            #[must_use]
            pub fn data(mut self, data: D) -> Self {
                self.base.data = Some(data);
                self
            }

            #[must_use]
            pub fn has_backdrop(mut self, has_backdrop: bool) -> Self {
                self.base.has_backdrop = has_backdrop;
                self
            }

            #[must_use]
            pub fn backdrop_class(mut self, class: impl Into<String>) -> Self {
                self.base.backdrop_class = Some(class.into());
                self
            }

            #[must_use]
            pub fn disable_close(mut self, disable: bool) -> Self {
                self.base.disable_close = disable;
                self
            }

            #[must_use]
            pub fn panel_class(mut self, class: impl Into<String>) -> Self {
                self.base.panel_class.push(class.into());
                self
            }

            #[must_use]
            pub fn aria(mut self, aria: portalkit_a11y::AriaAttributes) -> Self {
                self.base.aria = aria;
                self
            }

            #[must_use]
            pub fn focus_trap(mut self, enabled: bool) -> Self {
                self.base.focus_trap = enabled;
                self
            }
        }
    };
}

pub(crate) use portal_builders;
