#![forbid(unsafe_code)]

//! Bottom sheet: a surface pinned to the bottom edge that rests at snap
//! points and follows vertical drags.
//!
//! ```text
//!   Opening ─▶ Open(k) ─▶ Dragging ─┬─▶ Open(k')
//!                                   └─▶ Closing ─▶ Closed
//! ```
//!
//! - [`snap`]: declaring, parsing and choosing snap points.
//! - [`gesture`]: pointer tracking and release velocity.
//! - [`animation`]: visual state sequencing.
//! - [`BottomSheetRef`]: the handle application code holds.
//! - [`BottomSheet`]: the service that opens sheets and wires the above.
//!
//! # Example
//!
//! ```ignore
//! let sheet: BottomSheetRef<Filters, Choice> = sheets.open(
//!     BottomSheetConfig::new().snap_points([0.3, 0.6, 0.9]).initial_snap_point(1),
//!     |ctx| Filters::mount(&*ctx.surface, ctx.sheet),
//! );
//! let _sub = sheet.after_closed().subscribe(|choice| apply(choice));
//! ```

pub mod animation;
pub mod config;
pub mod gesture;
mod service;
mod sheet_ref;
pub mod snap;

pub use animation::SheetAnimator;
pub use config::{BottomSheetConfig, SheetBehavior};
pub use gesture::{GestureCallbacks, GestureState, GestureTracker, Swipe, SwipeDirection, is_swipe};
pub use service::{BottomSheet, DRAG_HANDLE_CLASS, SheetContext};
pub use sheet_ref::{BottomSheetRef, SheetHandle, WeakSheetRef};
pub use snap::{ParsedSnapPoint, SnapPoint, SnapPointError, SnapUnit};
