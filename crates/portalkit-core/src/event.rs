#![forbid(unsafe_code)]

//! Input events delivered by the host.
//!
//! Only the fields the overlay engine reads are modelled. Hosts translate
//! their native pointer and keyboard events into these types before
//! dispatching them to listeners registered on a
//! [`SurfaceElement`](crate::dom::SurfaceElement).

/// Opaque identity of a node in the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// The four pointer transitions the gesture tracker listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

impl PointerEventKind {
    /// All kinds, in registration order.
    pub const ALL: [Self; 4] = [Self::Down, Self::Move, Self::Up, Self::Cancel];

    /// DOM event type name.
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Down => "pointerdown",
            Self::Move => "pointermove",
            Self::Up => "pointerup",
            Self::Cancel => "pointercancel",
        }
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Host pointer id, used for pointer capture.
    pub pointer_id: i32,
    /// Whether this is the primary pointer of its type.
    pub is_primary: bool,
    /// Vertical position in viewport coordinates.
    pub client_y: f64,
    /// Node the event was dispatched to.
    pub target: NodeId,
}

impl PointerEvent {
    /// Create a primary pointer event with pointer id 1.
    pub fn primary(kind: PointerEventKind, client_y: f64, target: NodeId) -> Self {
        Self {
            kind,
            pointer_id: 1,
            is_primary: true,
            client_y,
            target,
        }
    }

    /// Mark this event as coming from a secondary pointer.
    #[must_use]
    pub fn secondary(mut self) -> Self {
        self.is_primary = false;
        self
    }

    /// Override the pointer id.
    #[must_use]
    pub fn with_pointer_id(mut self, pointer_id: i32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

/// What a listener did with an event.
///
/// `Consumed` is the equivalent of calling `preventDefault()` and
/// `stopPropagation()` on a DOM event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFlow {
    #[default]
    Continue,
    Consumed,
}

impl EventFlow {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}

/// Keys the overlay layer reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    Escape,
    Tab,
    Enter,
    /// Any other key, by its DOM `key` value.
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A keydown event on an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    #[inline]
    pub fn is_escape(&self) -> bool {
        self.key == Key::Escape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_key_mapping() {
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("Esc"), Key::Escape);
        assert_eq!(Key::from_dom("a"), Key::Other("a".into()));
        assert!(KeyEvent::new(Key::from_dom("Escape")).is_escape());
    }

    #[test]
    fn pointer_builders() {
        let ev = PointerEvent::primary(PointerEventKind::Move, 12.0, NodeId(3))
            .secondary()
            .with_pointer_id(7);
        assert!(!ev.is_primary);
        assert_eq!(ev.pointer_id, 7);
        assert_eq!(ev.kind.dom_name(), "pointermove");
    }
}
