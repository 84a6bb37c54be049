#![forbid(unsafe_code)]

//! In-memory host for portalkit.
//!
//! Stands in for the browser so the overlay engine can be driven end to
//! end: [`FakeElement`] keeps classes, styles and pointer listeners,
//! [`FakeDocument`] owns the viewport and focus, [`FakeOverlayHost`] hands
//! out overlays and [`PortalHarness`] wires them to the sheet, modal and
//! drop-down services over a [`TimerQueue`](portalkit_runtime::TimerQueue).
//!
//! ```ignore
//! let h = PortalHarness::new(1000.0, 900.0);
//! let sheet: BottomSheetRef<(), ()> = h.sheets.open(BottomSheetConfig::new(), |_| ());
//! h.settle();
//! ```

pub mod document;
pub mod element;
pub mod fixture;
pub mod overlay;

pub use document::{FakeDocument, RecordingFocusTraps};
pub use element::FakeElement;
pub use fixture::{FRAME, PortalHarness};
pub use overlay::{FakeOverlay, FakeOverlayHost};
