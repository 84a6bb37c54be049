#![forbid(unsafe_code)]

//! Modal dialog: a centered surface over a dimming backdrop.
//!
//! ```text
//!   Opening ─▶ Open ─▶ Closing ─▶ Closed
//! ```
//!
//! Modals stack independently of bottom sheets. Only the topmost one reacts
//! to backdrop clicks and Escape, and each close reports a [`CloseReason`].
//!
//! ```ignore
//! let modal: ModalRef<Confirm, bool> = modals.open(
//!     ModalConfig::new().role(AriaRole::AlertDialog),
//!     |ctx| Confirm::mount(&*ctx.surface, ctx.modal),
//! );
//! let _sub = modal.after_closed().subscribe(|res| log(res.reason));
//! ```

pub mod config;
mod modal_ref;
mod service;

pub use config::ModalConfig;
pub use modal_ref::{CloseReason, CloseResult, ModalHandle, ModalRef, WeakModalRef};
pub use service::{Modal, ModalContext};
