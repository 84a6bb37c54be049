#![forbid(unsafe_code)]

//! In-memory document and focus traps.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use portalkit_a11y::{FocusTrap, FocusTrapFactory};
use portalkit_core::dom::{Document, StyleTarget, SurfaceElement};
use portalkit_core::event::NodeId;

use crate::element::FakeElement;

/// A document with a fixed viewport height and a focus pointer.
#[derive(Debug)]
pub struct FakeDocument {
    body: Rc<FakeElement>,
    viewport_height: Cell<f64>,
    focused: Cell<Option<NodeId>>,
    detached: RefCell<Vec<NodeId>>,
}

impl FakeDocument {
    pub fn new(viewport_height: f64) -> Rc<Self> {
        Rc::new(Self {
            body: FakeElement::new(),
            viewport_height: Cell::new(viewport_height),
            focused: Cell::new(None),
            detached: RefCell::new(Vec::new()),
        })
    }

    pub fn body_element(&self) -> Rc<FakeElement> {
        Rc::clone(&self.body)
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.viewport_height.set(height);
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get()
    }

    /// Mark `node` as removed; focusing it fails from now on.
    pub fn detach_node(&self, node: NodeId) {
        self.detached.borrow_mut().push(node);
        if self.focused.get() == Some(node) {
            self.focused.set(None);
        }
    }
}

impl Document for FakeDocument {
    fn body(&self) -> Rc<dyn StyleTarget> {
        Rc::clone(&self.body) as Rc<dyn StyleTarget>
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height.get()
    }

    fn active_element(&self) -> Option<NodeId> {
        self.focused.get()
    }

    fn focus(&self, node: NodeId) -> bool {
        if self.detached.borrow().contains(&node) {
            return false;
        }
        self.focused.set(Some(node));
        true
    }
}

/// Focus trap factory that moves document focus into the trapped node and
/// counts lifecycle calls.
#[derive(Debug)]
pub struct RecordingFocusTraps {
    document: Rc<FakeDocument>,
    created: Cell<usize>,
    destroyed: Rc<Cell<usize>>,
}

impl RecordingFocusTraps {
    pub fn new(document: Rc<FakeDocument>) -> Rc<Self> {
        Rc::new(Self {
            document,
            created: Cell::new(0),
            destroyed: Rc::new(Cell::new(0)),
        })
    }

    pub fn created(&self) -> usize {
        self.created.get()
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.get()
    }

    /// Traps created and not yet destroyed.
    pub fn active(&self) -> usize {
        self.created() - self.destroyed()
    }
}

struct RecordingTrap {
    document: Rc<FakeDocument>,
    element: Rc<dyn SurfaceElement>,
    destroyed: Rc<Cell<usize>>,
    live: bool,
}

impl FocusTrap for RecordingTrap {
    fn focus_initial_element(&self) -> bool {
        self.document.focus(self.element.node_id())
    }

    fn destroy(&mut self) {
        if std::mem::take(&mut self.live) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }
}

impl FocusTrapFactory for RecordingFocusTraps {
    fn create(&self, element: Rc<dyn SurfaceElement>) -> Box<dyn FocusTrap> {
        self.created.set(self.created.get() + 1);
        Box::new(RecordingTrap {
            document: Rc::clone(&self.document),
            element,
            destroyed: Rc::clone(&self.destroyed),
            live: true,
        })
    }
}
