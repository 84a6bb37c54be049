#![forbid(unsafe_code)]

//! Event-loop plumbing for portalkit.
//!
//! - [`reactive`]: observable values and completable event streams.
//! - [`timer`]: the [`Scheduler`](timer::Scheduler) trait and the
//!   deterministic [`TimerQueue`](timer::TimerQueue).
//!
//! Everything here is single-threaded (`Rc`/`RefCell`), matching the
//! browser's one-thread event loop.

pub mod reactive;
pub mod timer;

pub use reactive::{EventStream, Observable, ReadOnlyObservable, Subject, Subscription};
pub use timer::{Scheduler, TimerId, TimerQueue};
