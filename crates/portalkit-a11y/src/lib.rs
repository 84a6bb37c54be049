#![forbid(unsafe_code)]

//! Accessibility collaborator for overlays.
//!
//! Opening a sheet or modal has four accessibility side effects:
//!
//! 1. ARIA role and labelling attributes on the surface.
//! 2. A focus trap confining Tab navigation to the surface.
//! 3. Remembering which node had focus, to restore it on close.
//! 4. Locking body scroll while any overlay is open.
//!
//! [`Accessibility`] is the seam the overlay services call. [`PortalAccessibility`]
//! implements it over a host [`Document`] and a [`FocusTrapFactory`].
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Saved focus target gone | `restore_focus` logs at debug and does nothing |
//! | No saved focus target | `restore_focus` does nothing |
//! | Scroll re-enabled without a prior disable | Overflow style is removed |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use portalkit_core::dom::{Document, SurfaceElement};
use portalkit_core::event::NodeId;

/// ARIA labelling attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AriaAttributes {
    /// `aria-label`.
    pub label: Option<String>,
    /// `aria-labelledby`.
    pub labelled_by: Option<String>,
    /// `aria-describedby`.
    pub described_by: Option<String>,
}

impl AriaAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn labelled_by(mut self, id: impl Into<String>) -> Self {
        self.labelled_by = Some(id.into());
        self
    }

    #[must_use]
    pub fn described_by(mut self, id: impl Into<String>) -> Self {
        self.described_by = Some(id.into());
        self
    }
}

/// ARIA role of an overlay surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AriaRole {
    #[default]
    Dialog,
    AlertDialog,
    /// Drop-down surfaces.
    Menu,
}

impl AriaRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
            Self::Menu => "menu",
        }
    }
}

/// A focus trap confining keyboard focus to one element.
pub trait FocusTrap {
    /// Move focus to the first tabbable element inside the trap.
    fn focus_initial_element(&self) -> bool;

    /// Release the trap. Calling it twice is harmless.
    fn destroy(&mut self);
}

/// Creates focus traps. Host-provided.
pub trait FocusTrapFactory {
    fn create(&self, element: Rc<dyn SurfaceElement>) -> Box<dyn FocusTrap>;
}

/// Accessibility side effects of opening and closing overlays.
pub trait Accessibility {
    /// Set `role` and any present labelling attributes on `element`.
    fn set_aria_attributes(&self, element: &dyn SurfaceElement, aria: &AriaAttributes, role: AriaRole);

    /// Create a trap around `element`, focusing its first tabbable child if `auto_focus`.
    fn create_focus_trap(&self, element: Rc<dyn SurfaceElement>, auto_focus: bool) -> Box<dyn FocusTrap>;

    /// Node that currently has focus.
    fn active_element(&self) -> Option<NodeId>;

    /// Give focus back to `node`.
    fn restore_focus(&self, node: Option<NodeId>);

    /// Prevent the page behind overlays from scrolling.
    fn disable_body_scroll(&self);

    /// Undo [`disable_body_scroll`](Self::disable_body_scroll).
    fn enable_body_scroll(&self);
}

/// [`Accessibility`] over a host document.
pub struct PortalAccessibility {
    document: Rc<dyn Document>,
    traps: Rc<dyn FocusTrapFactory>,
    /// Body `overflow` before the lock: `None` when unlocked, `Some(prev)` while locked.
    saved_overflow: RefCell<Option<Option<String>>>,
}

impl fmt::Debug for PortalAccessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalAccessibility")
            .field("scroll_locked", &self.saved_overflow.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl PortalAccessibility {
    pub fn new(document: Rc<dyn Document>, traps: Rc<dyn FocusTrapFactory>) -> Self {
        Self {
            document,
            traps,
            saved_overflow: RefCell::new(None),
        }
    }

    /// Whether body scroll is currently locked by this service.
    pub fn is_scroll_locked(&self) -> bool {
        self.saved_overflow.borrow().is_some()
    }
}

impl Accessibility for PortalAccessibility {
    fn set_aria_attributes(&self, element: &dyn SurfaceElement, aria: &AriaAttributes, role: AriaRole) {
        if let Some(label) = &aria.label {
            element.set_attribute("aria-label", label);
        }
        if let Some(id) = &aria.labelled_by {
            element.set_attribute("aria-labelledby", id);
        }
        if let Some(id) = &aria.described_by {
            element.set_attribute("aria-describedby", id);
        }
        element.set_attribute("role", role.as_str());
        element.set_attribute("aria-modal", "true");
    }

    fn create_focus_trap(&self, element: Rc<dyn SurfaceElement>, auto_focus: bool) -> Box<dyn FocusTrap> {
        let trap = self.traps.create(element);
        if auto_focus && !trap.focus_initial_element() {
            tracing::debug!("focus trap has no tabbable element to focus");
        }
        trap
    }

    fn active_element(&self) -> Option<NodeId> {
        self.document.active_element()
    }

    fn restore_focus(&self, node: Option<NodeId>) {
        if let Some(node) = node
            && !self.document.focus(node)
        {
            tracing::debug!(node = node.0, "previously focused node is gone; focus not restored");
        }
    }

    fn disable_body_scroll(&self) {
        let mut saved = self.saved_overflow.borrow_mut();
        if saved.is_some() {
            return;
        }
        let body = self.document.body();
        *saved = Some(body.style("overflow"));
        body.set_style("overflow", "hidden");
    }

    fn enable_body_scroll(&self) {
        let previous = self.saved_overflow.borrow_mut().take().flatten();
        let body = self.document.body();
        match previous {
            Some(value) => body.set_style("overflow", &value),
            None => body.remove_style("overflow"),
        }
    }
}
