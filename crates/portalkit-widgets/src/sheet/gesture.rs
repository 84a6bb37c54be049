#![forbid(unsafe_code)]

//! Vertical drag tracking for bottom sheets.
//!
//! Each sheet with dragging enabled gets a [`GestureState`] keyed by its id
//! and four pointer listeners on its drag handle.
//!
//! ```text
//!   Idle ── down (primary, inside handle) ──▶ Dragging
//!   Dragging ── move ──▶ Dragging          (on_move(delta, y))
//!   Dragging ── up ──▶ Idle                (on_end(velocity, delta))
//!   Dragging ── cancel ──▶ Idle            (no callback)
//! ```
//!
//! While any sheet is dragging, the body carries `user-select: none` and
//! `touch-action: none` through a [`DragStyleGuard`]. The guard is released
//! on up, cancel and [`GestureTracker::disable_gestures`].
//!
//! # Velocity
//!
//! Pixels per millisecond over the samples within [`VELOCITY_WINDOW`] of the
//! newest sample. Positive is downward. Fewer than two samples, or samples
//! with no time between them, give zero.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use ahash::AHashMap;
use portalkit_core::dom::{ListenerId, PointerListener, SurfaceElement};
use portalkit_core::drag_lock::{DragStyleGuard, DragStyleLock};
use portalkit_core::event::{EventFlow, PointerEvent, PointerEventKind};
use portalkit_core::time::{Clock, as_millis_f64};

/// Samples kept for velocity estimation.
pub const VELOCITY_HISTORY_SIZE: usize = 10;

/// Only samples this recent count toward the release velocity.
pub const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    y: f64,
    at: Duration,
}

/// Drag state of one sheet.
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    dragging: bool,
    start_y: f64,
    current_y: f64,
    history: VecDeque<Sample>,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[inline]
    pub fn start_y(&self) -> f64 {
        self.start_y
    }

    #[inline]
    pub fn current_y(&self) -> f64 {
        self.current_y
    }

    #[inline]
    pub fn delta_y(&self) -> f64 {
        self.current_y - self.start_y
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Enter `Dragging`. Returns `false` if already dragging.
    pub fn begin(&mut self, y: f64, at: Duration) -> bool {
        if self.dragging {
            return false;
        }
        self.dragging = true;
        self.start_y = y;
        self.current_y = y;
        self.history.clear();
        self.history.push_back(Sample { y, at });
        true
    }

    /// Record a move. Returns the delta from the start, or `None` when idle.
    pub fn update(&mut self, y: f64, at: Duration) -> Option<f64> {
        if !self.dragging {
            return None;
        }
        self.current_y = y;
        self.history.push_back(Sample { y, at });
        while self.history.len() > VELOCITY_HISTORY_SIZE {
            self.history.pop_front();
        }
        Some(self.delta_y())
    }

    /// Leave `Dragging` normally. Returns `(velocity, delta)`.
    pub fn finish(&mut self) -> Option<(f64, f64)> {
        if !self.dragging {
            return None;
        }
        let result = (self.velocity(), self.delta_y());
        self.reset();
        Some(result)
    }

    /// Abort the drag. Returns `false` when idle.
    pub fn cancel(&mut self) -> bool {
        if !self.dragging {
            return false;
        }
        self.reset();
        true
    }

    /// Current release velocity in px/ms.
    pub fn velocity(&self) -> f64 {
        let Some(newest) = self.history.back() else {
            return 0.0;
        };
        let mut recent = self
            .history
            .iter()
            .filter(|s| newest.at.saturating_sub(s.at) <= VELOCITY_WINDOW);
        let Some(oldest) = recent.next() else {
            return 0.0;
        };
        if recent.next().is_none() {
            return 0.0;
        }
        let dt = as_millis_f64(newest.at.saturating_sub(oldest.at));
        if dt == 0.0 {
            return 0.0;
        }
        (newest.y - oldest.y) / dt
    }

    fn reset(&mut self) {
        self.dragging = false;
        self.history.clear();
    }
}

/// Direction of a fling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
}

/// Result of [`is_swipe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
    pub is_swipe: bool,
    pub direction: Option<SwipeDirection>,
}

/// Classify a release velocity. The threshold is inclusive.
pub fn is_swipe(velocity: f64, threshold: f64) -> Swipe {
    if velocity.abs() < threshold {
        return Swipe {
            is_swipe: false,
            direction: None,
        };
    }
    let direction = if velocity > 0.0 {
        Some(SwipeDirection::Down)
    } else if velocity < 0.0 {
        Some(SwipeDirection::Up)
    } else {
        None
    };
    Swipe {
        is_swipe: true,
        direction,
    }
}

/// Callbacks invoked by the tracker. Run with no tracker state borrowed.
#[derive(Clone, Default)]
pub struct GestureCallbacks {
    pub on_start: Option<Rc<dyn Fn()>>,
    /// `(delta_y, current_y)`.
    pub on_move: Option<Rc<dyn Fn(f64, f64)>>,
    /// `(velocity, delta_y)`.
    pub on_end: Option<Rc<dyn Fn(f64, f64)>>,
}

impl fmt::Debug for GestureCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_move", &self.on_move.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

struct Binding {
    state: GestureState,
    handle: Rc<dyn SurfaceElement>,
    listeners: Vec<ListenerId>,
    guard: Option<DragStyleGuard>,
}

type Bindings = RefCell<AHashMap<String, Binding>>;

/// Attaches drag tracking to sheet drag handles.
#[derive(Clone)]
pub struct GestureTracker {
    bindings: Rc<Bindings>,
    clock: Rc<dyn Clock>,
    lock: DragStyleLock,
}

impl fmt::Debug for GestureTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureTracker")
            .field("sheets", &self.bindings.borrow().len())
            .field("lock", &self.lock)
            .finish()
    }
}

impl GestureTracker {
    pub fn new(clock: Rc<dyn Clock>, lock: DragStyleLock) -> Self {
        Self {
            bindings: Rc::new(RefCell::new(AHashMap::new())),
            clock,
            lock,
        }
    }

    /// Track drags on `handle` for the sheet `id`.
    ///
    /// Re-enabling an id replaces its previous binding.
    pub fn enable_gestures(
        &self,
        id: &str,
        handle: Rc<dyn SurfaceElement>,
        callbacks: GestureCallbacks,
    ) {
        self.disable_gestures(id);
        let weak = Rc::downgrade(&self.bindings);
        let listeners = PointerEventKind::ALL
            .iter()
            .map(|&kind| {
                let listener = self.listener(kind, id, weak.clone(), callbacks.clone());
                handle.add_pointer_listener(kind, listener)
            })
            .collect();
        self.bindings.borrow_mut().insert(
            id.to_owned(),
            Binding {
                state: GestureState::new(),
                handle,
                listeners,
                guard: None,
            },
        );
        tracing::trace!(sheet = id, "gestures enabled");
    }

    /// Detach listeners and drop state for `id`. No-op if never enabled.
    pub fn disable_gestures(&self, id: &str) -> bool {
        let Some(binding) = self.bindings.borrow_mut().remove(id) else {
            return false;
        };
        for listener in &binding.listeners {
            binding.handle.remove_pointer_listener(*listener);
        }
        drop(binding.guard);
        tracing::trace!(sheet = id, "gestures disabled");
        true
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        self.bindings
            .borrow()
            .get(id)
            .is_some_and(|b| b.state.is_dragging())
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.bindings.borrow().contains_key(id)
    }

    fn listener(
        &self,
        kind: PointerEventKind,
        id: &str,
        bindings: Weak<Bindings>,
        callbacks: GestureCallbacks,
    ) -> PointerListener {
        let id = id.to_owned();
        let clock = Rc::clone(&self.clock);
        let lock = self.lock.clone();
        Rc::new(move |event: &PointerEvent| {
            if !event.is_primary {
                return EventFlow::Continue;
            }
            let Some(bindings) = bindings.upgrade() else {
                return EventFlow::Continue;
            };
            match kind {
                PointerEventKind::Down => on_down(&bindings, &id, event, clock.now(), &lock, &callbacks),
                PointerEventKind::Move => on_move(&bindings, &id, event, clock.now(), &callbacks),
                PointerEventKind::Up => on_release(&bindings, &id, event, Some(&callbacks)),
                PointerEventKind::Cancel => on_release(&bindings, &id, event, None),
            }
        })
    }
}

fn on_down(
    bindings: &Bindings,
    id: &str,
    event: &PointerEvent,
    now: Duration,
    lock: &DragStyleLock,
    callbacks: &GestureCallbacks,
) -> EventFlow {
    {
        let mut map = bindings.borrow_mut();
        let Some(binding) = map.get_mut(id) else {
            return EventFlow::Continue;
        };
        if !binding.handle.contains(event.target) || !binding.state.begin(event.client_y, now) {
            return EventFlow::Continue;
        }
        binding.handle.set_pointer_capture(event.pointer_id);
        binding.guard = Some(lock.acquire());
    }
    tracing::trace!(sheet = id, y = event.client_y, "drag start");
    if let Some(cb) = &callbacks.on_start {
        cb();
    }
    EventFlow::Consumed
}

fn on_move(
    bindings: &Bindings,
    id: &str,
    event: &PointerEvent,
    now: Duration,
    callbacks: &GestureCallbacks,
) -> EventFlow {
    let delta = {
        let mut map = bindings.borrow_mut();
        let Some(delta) = map
            .get_mut(id)
            .and_then(|b| b.state.update(event.client_y, now))
        else {
            return EventFlow::Continue;
        };
        delta
    };
    tracing::trace!(sheet = id, y = event.client_y, delta, "drag move");
    if let Some(cb) = &callbacks.on_move {
        cb(delta, event.client_y);
    }
    EventFlow::Consumed
}

/// Up (`callbacks` present) or cancel (`None`).
fn on_release(
    bindings: &Bindings,
    id: &str,
    event: &PointerEvent,
    callbacks: Option<&GestureCallbacks>,
) -> EventFlow {
    let (outcome, guard) = {
        let mut map = bindings.borrow_mut();
        let Some(binding) = map.get_mut(id) else {
            return EventFlow::Continue;
        };
        let outcome = if callbacks.is_some() {
            binding.state.finish()
        } else {
            binding.state.cancel().then_some((0.0, 0.0))
        };
        if outcome.is_none() {
            return EventFlow::Continue;
        }
        if binding.handle.has_pointer_capture(event.pointer_id) {
            binding.handle.release_pointer_capture(event.pointer_id);
        }
        (outcome, binding.guard.take())
    };
    drop(guard);
    match (callbacks, outcome) {
        (Some(callbacks), Some((velocity, delta))) => {
            tracing::trace!(sheet = id, velocity, delta, "drag end");
            if let Some(cb) = &callbacks.on_end {
                cb(velocity, delta);
            }
        }
        _ => tracing::trace!(sheet = id, "drag cancelled"),
    }
    EventFlow::Consumed
}
