#![forbid(unsafe_code)]

//! Overlay widgets for portalkit.
//!
//! - [`overlay`]: the host primitive that creates floating surfaces.
//! - [`stack`]: the generic stack of open overlays, ids and z-index bands.
//! - [`sheet`]: the bottom sheet and its snap-point, gesture and animation engines.
//! - [`modal`]: centered dialogs with close reasons.
//! - [`dropdown`]: surfaces anchored to an origin node.
//!
//! [`guard`], [`portal`] and [`transition`] hold what the overlay kinds share.

pub mod dropdown;
pub mod guard;
pub mod modal;
pub mod overlay;
pub mod portal;
pub mod sheet;
pub mod stack;
pub mod transition;

pub use dropdown::{DropDown, DropDownConfig, DropDownContext, DropDownHandle, DropDownRef};
pub use guard::{CloseGuard, GuardError};
pub use modal::{
    CloseReason, CloseResult, Modal, ModalConfig, ModalContext, ModalHandle, ModalRef,
};
pub use overlay::{OverlayConfig, OverlayHandle, OverlayHost, PositionStrategy};
pub use portal::PortalConfig;
pub use sheet::{
    BottomSheet, BottomSheetConfig, BottomSheetRef, GestureCallbacks, GestureState,
    GestureTracker, ParsedSnapPoint, SheetAnimator, SheetBehavior, SheetContext, SheetHandle,
    SnapPoint, SnapPointError, SnapUnit, Swipe, SwipeDirection,
};
pub use stack::{OverlayEntry, StackManager, generate_id};
pub use transition::{Phase, PortalAnimator, TransitionStyle};
