#![forbid(unsafe_code)]

//! Core primitives for portalkit overlays.
//!
//! This crate holds everything the overlay engine needs from its host that
//! is not itself overlay logic:
//!
//! - [`geometry`]: bounding boxes in CSS pixels.
//! - [`event`]: pointer and keyboard events as delivered by the host.
//! - [`time`]: the [`Clock`](time::Clock) used to timestamp gesture samples.
//! - [`dom`]: the styleable-node traits the engine drives.
//! - [`classes`]: visual-state flags and their CSS class names.
//! - [`drag_lock`]: the reference-counted body style lock held during drags.
//!
//! Nothing here renders. Hosts implement the traits in [`dom`] over their
//! real node tree; `portalkit-harness` implements them in memory.

pub mod classes;
pub mod dom;
pub mod drag_lock;
pub mod event;
pub mod geometry;
pub mod time;

pub use classes::{ANIMATION_DURATION_VAR, SheetClasses, SurfacePart};
pub use dom::{Document, ListenerId, PointerListener, StyleTarget, SurfaceElement};
pub use drag_lock::{DragStyleGuard, DragStyleLock};
pub use event::{EventFlow, Key, KeyEvent, NodeId, PointerEvent, PointerEventKind};
pub use geometry::Rect;
pub use time::{Clock, MonotonicClock};
