#![forbid(unsafe_code)]

//! Overlay host collaborator.
//!
//! An overlay is a floating surface (plus an optional backdrop) layered above
//! the host's view tree. How it is created and rendered belongs to the host:
//! the widgets in this crate only ask an [`OverlayHost`] for one and then
//! drive the returned [`OverlayHandle`].
//!
//! # Contract
//!
//! - `dispose()` removes both nodes and emits on `detachments()` exactly once.
//!   Later calls are no-ops.
//! - `backdrop_click()` and `keydown()` emit while the overlay is attached and
//!   complete on disposal.

use std::rc::Rc;

use portalkit_core::dom::SurfaceElement;
use portalkit_core::event::{KeyEvent, NodeId};
use portalkit_runtime::EventStream;

/// Where the host should place the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionStrategy {
    /// Centered in the viewport.
    #[default]
    Centered,
    /// Pinned to the bottom edge, centered horizontally.
    BottomEdge,
    /// Below `origin`'s bottom-left corner, shifted by the offsets. The host
    /// flips above the origin when there is no room below.
    Anchored {
        origin: NodeId,
        offset_x: f64,
        offset_y: f64,
    },
    /// At fixed viewport coordinates.
    Offset { left: f64, top: f64 },
}

/// Parameters for creating an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub has_backdrop: bool,
    pub backdrop_class: String,
    pub panel_classes: Vec<String>,
    /// CSS width of the surface.
    pub width: String,
    /// CSS height of the surface; `None` sizes to content.
    pub height: Option<String>,
    /// CSS max-width of the surface.
    pub max_width: String,
    pub position: PositionStrategy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            has_backdrop: true,
            backdrop_class: String::new(),
            panel_classes: Vec::new(),
            width: "auto".to_owned(),
            height: None,
            max_width: "100vw".to_owned(),
            position: PositionStrategy::Centered,
        }
    }
}

/// One created overlay.
pub trait OverlayHandle {
    /// The node hosting the mounted component.
    fn surface(&self) -> Rc<dyn SurfaceElement>;

    /// The dimming layer, if the overlay was created with one.
    fn backdrop(&self) -> Option<Rc<dyn SurfaceElement>>;

    /// Remove the overlay from the document.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;

    /// Clicks landing on the backdrop.
    fn backdrop_click(&self) -> EventStream<()>;

    /// Key presses while the overlay is attached.
    fn keydown(&self) -> EventStream<KeyEvent>;

    /// Fires once when the overlay leaves the document.
    fn detachments(&self) -> EventStream<()>;
}

/// Creates overlays. Host-provided.
pub trait OverlayHost {
    fn create(&self, config: &OverlayConfig) -> Rc<dyn OverlayHandle>;
}
