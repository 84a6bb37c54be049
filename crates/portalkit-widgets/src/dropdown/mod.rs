#![forbid(unsafe_code)]

//! Drop-down: a surface anchored to an origin node, closed by clicking
//! outside or pressing Escape.
//!
//! ```ignore
//! let menu: DropDownRef<Menu, Action> = dropdowns.open(
//!     DropDownConfig::new().has_backdrop(false).y_offset(4.0),
//!     Some(&*button),
//!     |ctx| Menu::mount(&*ctx.surface, ctx.dropdown),
//! );
//! ```

pub mod config;
mod dropdown_ref;
mod service;

pub use config::DropDownConfig;
pub use dropdown_ref::{DropDownHandle, DropDownRef};
pub use service::{DropDown, DropDownContext};
