#![forbid(unsafe_code)]

//! Fully wired overlay services over in-memory fakes.

use std::rc::Rc;
use std::time::Duration;

use portalkit_a11y::PortalAccessibility;
use portalkit_core::event::PointerEventKind;
use portalkit_runtime::TimerQueue;
use portalkit_widgets::{BottomSheet, DropDown, Modal};

use crate::document::{FakeDocument, RecordingFocusTraps};
use crate::element::FakeElement;
use crate::overlay::FakeOverlayHost;

/// Interval between pointer samples in [`PortalHarness::drag`].
pub const FRAME: Duration = Duration::from_millis(16);

/// Every overlay service over one document and overlay host, driven by a
/// [`TimerQueue`].
#[derive(Debug)]
pub struct PortalHarness {
    pub timers: TimerQueue,
    pub document: Rc<FakeDocument>,
    pub host: Rc<FakeOverlayHost>,
    pub traps: Rc<RecordingFocusTraps>,
    pub a11y: Rc<PortalAccessibility>,
    pub sheets: BottomSheet,
    pub modals: Modal,
    pub dropdowns: DropDown,
}

impl PortalHarness {
    /// Viewport of `viewport` px; every surface is `sheet_height` px tall.
    pub fn new(viewport: f64, sheet_height: f64) -> Self {
        let timers = TimerQueue::new();
        let document = FakeDocument::new(viewport);
        let host = FakeOverlayHost::new(Rc::clone(&document), sheet_height);
        let traps = RecordingFocusTraps::new(Rc::clone(&document));
        let a11y = Rc::new(PortalAccessibility::new(document.clone(), traps.clone()));
        let sheets = BottomSheet::new(
            host.clone(),
            document.clone(),
            a11y.clone(),
            Rc::new(timers.clone()),
            Rc::new(timers.clone()),
        );
        let modals = Modal::new(host.clone(), a11y.clone(), Rc::new(timers.clone()));
        let dropdowns = DropDown::new(host.clone(), a11y.clone(), Rc::new(timers.clone()));
        Self {
            timers,
            document,
            host,
            traps,
            a11y,
            sheets,
            modals,
            dropdowns,
        }
    }

    pub fn advance(&self, dt: Duration) -> usize {
        self.timers.advance(dt)
    }

    /// Let every pending transition finish.
    pub fn settle(&self) -> usize {
        self.timers.run_until_idle()
    }

    /// Press on `target` at `path[0]`, move through the rest one [`FRAME`]
    /// apart, then release at the last point.
    ///
    /// A non-zero `hold` rests the pointer at the last point for that long
    /// before releasing, reporting one more move there. A hold longer than
    /// the velocity window releases at zero velocity.
    pub fn drag(&self, target: &FakeElement, path: &[f64], hold: Duration) {
        let Some((&first, rest)) = path.split_first() else {
            return;
        };
        target.pointer(PointerEventKind::Down, first);
        let mut last = first;
        for &y in rest {
            self.timers.advance(FRAME);
            target.pointer(PointerEventKind::Move, y);
            last = y;
        }
        if !hold.is_zero() {
            self.timers.advance(hold);
            target.pointer(PointerEventKind::Move, last);
        }
        target.pointer(PointerEventKind::Up, last);
    }
}
