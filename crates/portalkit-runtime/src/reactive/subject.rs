#![forbid(unsafe_code)]

//! Completable event streams.
//!
//! A [`Subject<T>`] is the producer side: it emits values and can be
//! completed exactly once. [`EventStream<T>`] is the consumer side handed to
//! callers, who can only subscribe. Both are cheap `Rc` clones of the same
//! channel.
//!
//! # Failure Modes
//!
//! - Emitting after completion: ignored.
//! - Completing twice: the second call is ignored.
//! - Subscribing after completion: the returned [`Subscription`] is inert.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Channel<T> {
    subscribers: RefCell<Vec<(u64, Callback<T>)>>,
    completion: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    next_id: Cell<u64>,
    completed: Cell<bool>,
    emitted: Cell<u64>,
}

impl<T> Channel<T> {
    fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            completion: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            completed: Cell::new(false),
            emitted: Cell::new(0),
        }
    }

    fn allocate_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// Producer side of an event stream.
pub struct Subject<T> {
    channel: Rc<Channel<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            channel: Rc::clone(&self.channel),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("subscribers", &self.channel.subscribers.borrow().len())
            .field("emitted", &self.channel.emitted.get())
            .field("completed", &self.channel.completed.get())
            .finish()
    }
}

impl<T> Subject<T> {
    pub fn new() -> Self {
        Self {
            channel: Rc::new(Channel::new()),
        }
    }

    /// Deliver `value` to every current subscriber.
    pub fn emit(&self, value: T) {
        if self.channel.completed.get() {
            return;
        }
        self.channel.emitted.set(self.channel.emitted.get() + 1);
        let snapshot: Vec<(u64, Callback<T>)> = self.channel.subscribers.borrow().clone();
        for (id, callback) in snapshot {
            // Skip callbacks unsubscribed by an earlier callback in this pass.
            let still_subscribed = self
                .channel
                .subscribers
                .borrow()
                .iter()
                .any(|(live, _)| *live == id);
            if still_subscribed {
                callback(&value);
            }
        }
    }

    /// Close the stream. Completion callbacks run once; later emits are ignored.
    pub fn complete(&self) {
        if self.channel.completed.replace(true) {
            return;
        }
        let callbacks: Vec<(u64, Rc<dyn Fn()>)> = self.channel.completion.take();
        self.channel.subscribers.borrow_mut().clear();
        for (_, callback) in callbacks {
            callback();
        }
    }

    /// Emit one final value and complete.
    pub fn emit_and_complete(&self, value: T) {
        self.emit(value);
        self.complete();
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.channel.completed.get()
    }

    /// Number of values emitted so far.
    #[inline]
    pub fn emitted(&self) -> u64 {
        self.channel.emitted.get()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.channel.subscribers.borrow().len()
    }

    /// Consumer view of this subject.
    pub fn stream(&self) -> EventStream<T> {
        EventStream {
            channel: Rc::clone(&self.channel),
        }
    }
}

impl<T: 'static> Subject<T> {
    /// Subscribe directly on the producer side.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.stream().subscribe(callback)
    }
}

/// Subscribe-only view of a [`Subject`].
pub struct EventStream<T> {
    channel: Rc<Channel<T>>,
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            channel: Rc::clone(&self.channel),
        }
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("completed", &self.channel.completed.get())
            .finish()
    }
}

impl<T: 'static> EventStream<T> {
    /// Register `callback` for every future value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        if self.channel.completed.get() {
            return Subscription::inert();
        }
        let id = self.channel.allocate_id();
        self.channel
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(callback)));
        let weak: Weak<Channel<T>> = Rc::downgrade(&self.channel);
        Subscription::new(move || {
            if let Some(channel) = weak.upgrade() {
                channel.subscribers.borrow_mut().retain(|(live, _)| *live != id);
                channel.completion.borrow_mut().retain(|(live, _)| *live != id);
            }
        })
    }

    /// Register `callback` to run when the stream completes.
    ///
    /// Runs immediately if the stream has already completed.
    pub fn on_complete(&self, callback: impl Fn() + 'static) -> Subscription {
        if self.channel.completed.get() {
            callback();
            return Subscription::inert();
        }
        let id = self.channel.allocate_id();
        self.channel
            .completion
            .borrow_mut()
            .push((id, Rc::new(callback)));
        let weak: Weak<Channel<T>> = Rc::downgrade(&self.channel);
        Subscription::new(move || {
            if let Some(channel) = weak.upgrade() {
                channel.completion.borrow_mut().retain(|(live, _)| *live != id);
            }
        })
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.channel.completed.get()
    }
}

/// RAII guard for a subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that is not attached to anything.
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    /// Keep the subscription alive for as long as its source lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    /// Unsubscribe now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
