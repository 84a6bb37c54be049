#![forbid(unsafe_code)]

//! In-memory node.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use portalkit_core::dom::{ListenerId, PointerListener, StyleTarget, SurfaceElement};
use portalkit_core::event::{EventFlow, NodeId, PointerEvent, PointerEventKind};
use portalkit_core::geometry::Rect;

static NODE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A node with classes, inline styles, attributes, children and pointer
/// listeners.
///
/// Layout is simulated: the box sits at `base_top` with a fixed height, and
/// `bounding_rect` adds the current `translateY` transform.
pub struct FakeElement {
    id: NodeId,
    classes: RefCell<Vec<String>>,
    styles: RefCell<BTreeMap<String, String>>,
    attributes: RefCell<BTreeMap<String, String>>,
    children: RefCell<Vec<Rc<FakeElement>>>,
    listeners: RefCell<Vec<(ListenerId, PointerEventKind, PointerListener)>>,
    captures: RefCell<Vec<i32>>,
    next_listener: Cell<u64>,
    base_top: Cell<f64>,
    width: Cell<f64>,
    height: Cell<f64>,
    layout_reads: Cell<u32>,
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeElement")
            .field("id", &self.id)
            .field("classes", &self.classes.borrow())
            .field("styles", &self.styles.borrow())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

impl FakeElement {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: NodeId(NODE_COUNTER.fetch_add(1, Ordering::Relaxed)),
            classes: RefCell::new(Vec::new()),
            styles: RefCell::new(BTreeMap::new()),
            attributes: RefCell::new(BTreeMap::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            captures: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            base_top: Cell::new(0.0),
            width: Cell::new(0.0),
            height: Cell::new(0.0),
            layout_reads: Cell::new(0),
        })
    }

    /// A node already carrying `class`.
    pub fn with_class(class: &str) -> Rc<Self> {
        let el = Self::new();
        el.add_class(class);
        el
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn append_child(&self, child: Rc<FakeElement>) {
        self.children.borrow_mut().push(child);
    }

    /// Place the untransformed box.
    pub fn set_layout(&self, top: f64, width: f64, height: f64) {
        self.base_top.set(top);
        self.width.set(width);
        self.height.set(height);
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }

    /// Number of synchronous layout reads so far.
    pub fn layout_reads(&self) -> u32 {
        self.layout_reads.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn captured_pointers(&self) -> Vec<i32> {
        self.captures.borrow().clone()
    }

    /// Deliver `event` to the listeners of its kind.
    ///
    /// Listeners are snapshotted first, so they may add or remove listeners.
    pub fn dispatch(&self, event: PointerEvent) -> EventFlow {
        let snapshot: Vec<(ListenerId, PointerListener)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(id, _, listener)| (*id, Rc::clone(listener)))
            .collect();
        let mut flow = EventFlow::Continue;
        for (id, listener) in snapshot {
            let live = self.listeners.borrow().iter().any(|(l, _, _)| *l == id);
            if live && listener(&event).is_consumed() {
                flow = EventFlow::Consumed;
            }
        }
        flow
    }

    /// Dispatch a primary pointer event of `kind` at `y`, targeting this node.
    pub fn pointer(&self, kind: PointerEventKind, y: f64) -> EventFlow {
        self.dispatch(PointerEvent::primary(kind, y, self.id))
    }
}

impl StyleTarget for FakeElement {
    fn set_style(&self, property: &str, value: &str) {
        self.styles
            .borrow_mut()
            .insert(property.to_owned(), value.to_owned());
    }

    fn remove_style(&self, property: &str) {
        self.styles.borrow_mut().remove(property);
    }

    fn style(&self, property: &str) -> Option<String> {
        self.styles.borrow().get(property).cloned()
    }
}

impl SurfaceElement for FakeElement {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn contains(&self, node: NodeId) -> bool {
        self.id == node || self.children.borrow().iter().any(|c| c.contains(node))
    }

    fn query_class(&self, class: &str) -> Option<Rc<dyn SurfaceElement>> {
        let children = self.children.borrow();
        for child in children.iter() {
            if child.has_class(class) {
                return Some(Rc::clone(child) as Rc<dyn SurfaceElement>);
            }
            if let Some(found) = child.query_class(class) {
                return Some(found);
            }
        }
        None
    }

    fn add_class(&self, class: &str) {
        let mut classes = self.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn bounding_rect(&self) -> Rect {
        self.layout_reads.set(self.layout_reads.get() + 1);
        let dy = self.translate_y().unwrap_or(0.0);
        Rect::new(0.0, self.base_top.get(), self.width.get(), self.height.get()).translate_y(dy)
    }

    fn offset_height(&self) -> f64 {
        self.layout_reads.set(self.layout_reads.get() + 1);
        self.height.get()
    }

    fn add_pointer_listener(&self, kind: PointerEventKind, listener: PointerListener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, kind, listener));
        id
    }

    fn remove_pointer_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _, _)| *l != id);
    }

    fn set_pointer_capture(&self, pointer_id: i32) {
        let mut captures = self.captures.borrow_mut();
        if !captures.contains(&pointer_id) {
            captures.push(pointer_id);
        }
    }

    fn release_pointer_capture(&self, pointer_id: i32) {
        self.captures.borrow_mut().retain(|p| *p != pointer_id);
    }

    fn has_pointer_capture(&self, pointer_id: i32) -> bool {
        self.captures.borrow().contains(&pointer_id)
    }
}
