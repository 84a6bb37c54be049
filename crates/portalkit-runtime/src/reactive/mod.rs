#![forbid(unsafe_code)]

//! Reactive primitives for overlay state.
//!
//! - [`Observable`]: a shared, version-tracked value with change
//!   notification.
//! - [`ReadOnlyObservable`]: a view of an `Observable` without `set`.
//! - [`Subject`]: a push-only stream of events that can be completed.
//! - [`EventStream`]: the subscribe-only half of a `Subject`.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Setting an `Observable` to its current value is a no-op (no version
//!    bump, no notification).
//! 3. A `Subject` delivers nothing after `complete()`, and a subscriber
//!    registered after completion is never called.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification, including when dropped from inside a callback.
//! 5. Callbacks may freely subscribe, unsubscribe, emit, or complete during
//!    delivery; delivery iterates over a snapshot of the subscriber list.

mod observable;
mod subject;

pub use observable::{Observable, ReadOnlyObservable};
pub use subject::{EventStream, Subject, Subscription};
