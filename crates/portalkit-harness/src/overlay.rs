#![forbid(unsafe_code)]

//! In-memory overlay host.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use portalkit_core::dom::SurfaceElement;
use portalkit_core::event::{Key, KeyEvent};
use portalkit_runtime::{EventStream, Subject};
use portalkit_widgets::overlay::{OverlayConfig, OverlayHandle, OverlayHost};

use crate::document::FakeDocument;
use crate::element::FakeElement;

/// One overlay created by [`FakeOverlayHost`].
pub struct FakeOverlay {
    config: OverlayConfig,
    surface: Rc<FakeElement>,
    backdrop: Option<Rc<FakeElement>>,
    drag_handle: Option<Rc<FakeElement>>,
    disposed: Cell<bool>,
    backdrop_clicks: Subject<()>,
    keys: Subject<KeyEvent>,
    detach: Subject<()>,
}

impl fmt::Debug for FakeOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeOverlay")
            .field("surface", &self.surface.id())
            .field("has_backdrop", &self.backdrop.is_some())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

impl FakeOverlay {
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn surface_element(&self) -> Rc<FakeElement> {
        Rc::clone(&self.surface)
    }

    pub fn backdrop_element(&self) -> Option<Rc<FakeElement>> {
        self.backdrop.clone()
    }

    /// The `.bottom-sheet-drag-handle` child, when the host was asked to
    /// render one.
    pub fn drag_handle_element(&self) -> Option<Rc<FakeElement>> {
        self.drag_handle.clone()
    }

    /// Whatever a drag should start on: the handle if present, else the surface.
    pub fn grab_target(&self) -> Rc<FakeElement> {
        self.drag_handle
            .clone()
            .unwrap_or_else(|| Rc::clone(&self.surface))
    }

    pub fn click_backdrop(&self) {
        if self.backdrop.is_some() && !self.disposed.get() {
            self.backdrop_clicks.emit(());
        }
    }

    pub fn press_key(&self, key: Key) {
        if !self.disposed.get() {
            self.keys.emit(KeyEvent::new(key));
        }
    }
}

impl OverlayHandle for FakeOverlay {
    fn surface(&self) -> Rc<dyn SurfaceElement> {
        Rc::clone(&self.surface) as Rc<dyn SurfaceElement>
    }

    fn backdrop(&self) -> Option<Rc<dyn SurfaceElement>> {
        self.backdrop
            .clone()
            .map(|el| el as Rc<dyn SurfaceElement>)
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        tracing::trace!(surface = self.surface.id().0, "overlay disposed");
        self.detach.emit_and_complete(());
        self.backdrop_clicks.complete();
        self.keys.complete();
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    fn backdrop_click(&self) -> EventStream<()> {
        self.backdrop_clicks.stream()
    }

    fn keydown(&self) -> EventStream<KeyEvent> {
        self.keys.stream()
    }

    fn detachments(&self) -> EventStream<()> {
        self.detach.stream()
    }
}

/// Overlay host laying every surface out against the bottom of a
/// [`FakeDocument`] viewport.
pub struct FakeOverlayHost {
    document: Rc<FakeDocument>,
    surface_height: Cell<f64>,
    with_drag_handle: Cell<bool>,
    created: RefCell<Vec<Rc<FakeOverlay>>>,
}

impl fmt::Debug for FakeOverlayHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeOverlayHost")
            .field("surface_height", &self.surface_height.get())
            .field("created", &self.created.borrow().len())
            .finish()
    }
}

impl FakeOverlayHost {
    pub fn new(document: Rc<FakeDocument>, surface_height: f64) -> Rc<Self> {
        Rc::new(Self {
            document,
            surface_height: Cell::new(surface_height),
            with_drag_handle: Cell::new(false),
            created: RefCell::new(Vec::new()),
        })
    }

    pub fn set_surface_height(&self, height: f64) {
        self.surface_height.set(height);
    }

    /// Render a `.bottom-sheet-drag-handle` child in new surfaces.
    pub fn set_drag_handle(&self, enabled: bool) {
        self.with_drag_handle.set(enabled);
    }

    pub fn created(&self) -> Vec<Rc<FakeOverlay>> {
        self.created.borrow().clone()
    }

    pub fn last(&self) -> Option<Rc<FakeOverlay>> {
        self.created.borrow().last().cloned()
    }
}

impl OverlayHost for FakeOverlayHost {
    fn create(&self, config: &OverlayConfig) -> Rc<dyn OverlayHandle> {
        use portalkit_core::dom::Document;

        let viewport = self.document.viewport_height();
        let height = self.surface_height.get();
        let surface = FakeElement::new();
        surface.set_layout(viewport - height, 0.0, height);
        for class in &config.panel_classes {
            surface.add_class(class);
        }
        let drag_handle = self.with_drag_handle.get().then(|| {
            let handle = FakeElement::with_class("bottom-sheet-drag-handle");
            surface.append_child(Rc::clone(&handle));
            handle
        });
        let backdrop = config.has_backdrop.then(|| {
            let backdrop = FakeElement::new();
            if !config.backdrop_class.is_empty() {
                backdrop.add_class(&config.backdrop_class);
            }
            backdrop
        });
        let overlay = Rc::new(FakeOverlay {
            config: config.clone(),
            surface,
            backdrop,
            drag_handle,
            disposed: Cell::new(false),
            backdrop_clicks: Subject::new(),
            keys: Subject::new(),
            detach: Subject::new(),
        });
        self.created.borrow_mut().push(Rc::clone(&overlay));
        overlay
    }
}
