#![forbid(unsafe_code)]

//! portalkit public facade.
//!
//! Stacked overlays for browser-style hosts: a draggable bottom sheet that
//! rests on snap points, modal dialogs and anchored drop-downs. The member
//! crates are re-exported whole; the [`prelude`] carries what opening any of
//! them needs.
//!
//! ```ignore
//! use portalkit::prelude::*;
//!
//! let sheets = BottomSheet::new(host, document, a11y, scheduler, clock);
//! let sheet: BottomSheetRef<MyMenu, Choice> = sheets.open(
//!     BottomSheetConfig::new()
//!         .snap_points([0.3, 0.6, 0.9])
//!         .initial_snap_point(1),
//!     |ctx| MyMenu::mount(ctx.surface),
//! );
//! sheet.after_closed().subscribe(|choice| apply(choice)).detach();
//! ```

pub use portalkit_a11y as a11y;
pub use portalkit_core as primitives;
#[cfg(feature = "harness")]
pub use portalkit_harness as harness;
pub use portalkit_runtime as runtime;
pub use portalkit_widgets as widgets;

pub mod prelude {
    pub use portalkit_a11y::{
        Accessibility, AriaAttributes, AriaRole, FocusTrap, FocusTrapFactory, PortalAccessibility,
    };
    pub use portalkit_core::{
        Clock, Document, EventFlow, Key, KeyEvent, MonotonicClock, NodeId, PointerEvent,
        PointerEventKind, Rect, StyleTarget, SurfaceElement,
    };
    pub use portalkit_runtime::{EventStream, Observable, Scheduler, Subscription, TimerQueue};
    pub use portalkit_widgets::{
        BottomSheet, BottomSheetConfig, BottomSheetRef, CloseReason, CloseResult, DropDown,
        DropDownConfig, DropDownRef, GuardError, Modal, ModalConfig, ModalRef, OverlayConfig,
        OverlayHandle, OverlayHost, PortalConfig, SheetBehavior, SheetContext, SheetHandle,
        SnapPoint, StackManager,
    };
}
