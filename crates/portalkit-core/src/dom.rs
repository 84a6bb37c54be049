#![forbid(unsafe_code)]

//! Collaborator traits for the host node tree.
//!
//! The overlay engine never creates or renders nodes. It receives
//! already-mounted nodes from the host and drives them through these traits:
//! toggling state classes, writing inline styles, reading layout, and
//! registering pointer listeners.
//!
//! # Contract
//!
//! - All methods take `&self`; implementations use interior mutability.
//! - Listener dispatch must not hold internal borrows while a listener runs.
//!   Listeners routinely remove themselves (a drag ending in a dismissal
//!   detaches every listener of the sheet).
//! - `offset_height()` and `bounding_rect()` are synchronous layout reads.
//!   Calling them flushes pending style changes, which the animation
//!   coordinator relies on to start CSS transitions from the right place.

use std::rc::Rc;

use crate::event::{EventFlow, NodeId, PointerEvent, PointerEventKind};
use crate::geometry::Rect;

/// Handle for a registered listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A pointer event listener.
pub type PointerListener = Rc<dyn Fn(&PointerEvent) -> EventFlow>;

/// Something with an inline style declaration.
pub trait StyleTarget {
    /// Set an inline style property (also used for CSS custom properties).
    fn set_style(&self, property: &str, value: &str);

    /// Remove an inline style property.
    fn remove_style(&self, property: &str);

    /// Read an inline style property.
    fn style(&self, property: &str) -> Option<String>;
}

/// A styleable node hosting (part of) an overlay.
pub trait SurfaceElement: StyleTarget {
    /// Identity of this node.
    fn node_id(&self) -> NodeId;

    /// Whether `node` is this node or one of its descendants.
    fn contains(&self, node: NodeId) -> bool;

    /// First descendant carrying `class`, if any.
    fn query_class(&self, class: &str) -> Option<Rc<dyn SurfaceElement>>;

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    fn set_attribute(&self, name: &str, value: &str);
    fn attribute(&self, name: &str) -> Option<String>;

    /// Current border box in viewport coordinates, transforms included.
    fn bounding_rect(&self) -> Rect;

    /// Layout height, transforms excluded. Forces a synchronous layout.
    fn offset_height(&self) -> f64;

    fn add_pointer_listener(&self, kind: PointerEventKind, listener: PointerListener)
    -> ListenerId;
    fn remove_pointer_listener(&self, id: ListenerId);

    fn set_pointer_capture(&self, pointer_id: i32);
    fn release_pointer_capture(&self, pointer_id: i32);
    fn has_pointer_capture(&self, pointer_id: i32) -> bool;

    /// Write a vertical translation as the element's `transform`.
    fn set_translate_y(&self, px: f64) {
        self.set_style("transform", &format_translate_y(px));
    }

    /// Vertical translation currently set through [`set_translate_y`](Self::set_translate_y).
    fn translate_y(&self) -> Option<f64> {
        self.style("transform")
            .and_then(|value| parse_translate_y(&value))
    }
}

/// The document the overlays live in.
pub trait Document {
    /// The `<body>` element's style, target of scroll and selection locks.
    fn body(&self) -> Rc<dyn StyleTarget>;

    /// `window.innerHeight`.
    fn viewport_height(&self) -> f64;

    /// Currently focused node.
    fn active_element(&self) -> Option<NodeId>;

    /// Move focus to `node`. Returns `false` if the node is gone or not focusable.
    fn focus(&self, node: NodeId) -> bool;
}

/// Format a `translateY(..px)` transform value.
pub fn format_translate_y(px: f64) -> String {
    format!("translateY({px}px)")
}

/// Parse a value produced by [`format_translate_y`].
pub fn parse_translate_y(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_prefix("translateY(")?
        .strip_suffix(')')?
        .trim()
        .strip_suffix("px")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_round_trip_values() {
        assert_eq!(format_translate_y(300.0), "translateY(300px)");
        assert_eq!(format_translate_y(12.5), "translateY(12.5px)");
        assert_eq!(parse_translate_y("translateY(-4px)"), Some(-4.0));
        assert_eq!(parse_translate_y(" translateY( 7px ) "), Some(7.0));
    }

    #[test]
    fn parse_rejects_other_transforms() {
        assert_eq!(parse_translate_y("translateX(4px)"), None);
        assert_eq!(parse_translate_y("translateY(4%)"), None);
        assert_eq!(parse_translate_y(""), None);
    }
}
