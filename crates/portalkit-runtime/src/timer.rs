#![forbid(unsafe_code)]

//! Timers for animation sequencing.
//!
//! The overlay engine suspends only on timers: an animation starts, a timer
//! for its duration fires, and the next state is applied. [`Scheduler`] is
//! the seam; [`TimerQueue`] is a deterministic implementation driven by the
//! host (or a test) calling [`TimerQueue::advance`].
//!
//! # Invariants
//!
//! - Timers fire in due-time order; ties fire in scheduling order.
//! - A cleared timer never fires.
//! - Callbacks may schedule or clear timers; a timer scheduled during
//!   `advance` with a due time inside the advanced window fires in the same
//!   call.
//! - The queue's clock reads the due time of the timer being fired while its
//!   callback runs, and the target time after `advance` returns.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use portalkit_core::time::Clock;

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Something that can run a callback later.
pub trait Scheduler {
    /// Run `callback` once after `delay`.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending timer. Returns `false` if it already fired or was cleared.
    fn clear_timeout(&self, id: TimerId) -> bool;
}

type Pending = BTreeMap<(Duration, u64), Box<dyn FnOnce()>>;

struct QueueInner {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    pending: RefCell<Pending>,
}

/// Host-driven timer queue.
///
/// Clones share the same queue.
#[derive(Clone)]
pub struct TimerQueue {
    inner: Rc<QueueInner>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.inner.now.get())
            .field("pending", &self.inner.pending.borrow().len())
            .finish()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(QueueInner {
                now: Cell::new(Duration::ZERO),
                next_id: Cell::new(1),
                pending: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Current queue time.
    #[inline]
    pub fn current_time(&self) -> Duration {
        self.inner.now.get()
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Due time of the next timer, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.inner
            .pending
            .borrow()
            .first_key_value()
            .map(|((due, _), _)| *due)
    }

    /// Move time forward by `dt`, firing every timer that comes due.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.inner.now.get() + dt;
        self.advance_to(target)
    }

    /// Move time forward to `target`, firing every timer due at or before it.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        loop {
            let next = {
                let mut pending = self.inner.pending.borrow_mut();
                match pending.first_key_value() {
                    Some(((due, _), _)) if *due <= target => pending.pop_first(),
                    _ => None,
                }
            };
            let Some(((due, id), callback)) = next else {
                break;
            };
            if due > self.inner.now.get() {
                self.inner.now.set(due);
            }
            tracing::trace!(timer = id, due_ms = due.as_millis() as u64, "timer fired");
            callback();
            fired += 1;
        }
        if target > self.inner.now.get() {
            self.inner.now.set(target);
        }
        fired
    }

    /// Fire everything, advancing time as far as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(due) = self.next_due() {
            fired += self.advance_to(due);
        }
        fired
    }
}

impl Scheduler for TimerQueue {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let due = self.inner.now.get() + delay;
        self.inner.pending.borrow_mut().insert((due, id), callback);
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) -> bool {
        let mut pending = self.inner.pending.borrow_mut();
        let before = pending.len();
        pending.retain(|(_, live), _| *live != id.0);
        pending.len() != before
    }
}

impl Clock for TimerQueue {
    fn now(&self) -> Duration {
        self.inner.now.get()
    }
}
