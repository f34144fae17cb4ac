//! Typed publish/subscribe event bus.
//!
//! The sole coupling between the domain core and its observers (the
//! sync controller, logging tools, the external toolkit layer).
//! Dispatch is synchronous and in subscription order; events published
//! from inside a handler are queued and flushed after the current
//! dispatch completes, so re-entrant publication never reorders
//! delivery. A failing handler is reported as a diagnostic and never
//! aborts delivery to the handlers after it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cantata_types::{Event, EventKind};

/// Events a handler wants to publish during dispatch. They are
/// flushed, in order, once the current event has been delivered to
/// every handler.
#[derive(Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn publish(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Outcome of one handler invocation. Errors are logged, not
/// propagated.
pub type HandlerResult = Result<(), String>;

pub type Handler = Box<dyn FnMut(&Event, &mut EventQueue) -> HandlerResult>;

/// Cancellation token returned by `subscribe`. Cancelling is safe at
/// any time, including from inside the handler it belongs to; the bus
/// prunes cancelled subscriptions lazily.
#[derive(Clone)]
pub struct SubscriptionToken {
    cancelled: Arc<AtomicBool>,
}

impl SubscriptionToken {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

struct Subscriber {
    token: SubscriptionToken,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    by_kind: HashMap<EventKind, Vec<Subscriber>>,
    catch_all: Vec<Subscriber>,
    pending: VecDeque<Event>,
    dispatching: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionToken
    where
        F: FnMut(&Event, &mut EventQueue) -> HandlerResult + 'static,
    {
        let token = SubscriptionToken::new();
        self.by_kind.entry(kind).or_default().push(Subscriber {
            token: token.clone(),
            handler: Box::new(handler),
        });
        token
    }

    /// Register a handler for every event. Catch-all handlers run
    /// after the kind-specific handlers of each event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionToken
    where
        F: FnMut(&Event, &mut EventQueue) -> HandlerResult + 'static,
    {
        let token = SubscriptionToken::new();
        self.catch_all.push(Subscriber {
            token: token.clone(),
            handler: Box::new(handler),
        });
        token
    }

    /// Publish an event, delivering it synchronously to every live
    /// subscriber of its kind and then to every catch-all subscriber.
    /// If called during dispatch (via a handler's [`EventQueue`] this
    /// is not possible; via a re-entrant caller it is), the event is
    /// queued behind the one currently being delivered.
    pub fn publish(&mut self, event: Event) {
        self.pending.push_back(event);
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(event) = self.pending.pop_front() {
            self.dispatch_one(&event);
        }
        self.dispatching = false;
    }

    fn dispatch_one(&mut self, event: &Event) {
        let kind = event.kind();
        let mut queue = EventQueue::default();

        if let Some(subscribers) = self.by_kind.get_mut(&kind) {
            deliver(subscribers, event, &mut queue);
            subscribers.retain(|s| !s.token.is_cancelled());
        }
        deliver(&mut self.catch_all, event, &mut queue);
        self.catch_all.retain(|s| !s.token.is_cancelled());

        // Handler-published events flush after the current dispatch.
        self.pending.extend(queue.events);
    }

    /// Number of live subscriptions (kind-specific plus catch-all).
    pub fn subscriber_count(&self) -> usize {
        self.by_kind.values().map(|v| v.len()).sum::<usize>() + self.catch_all.len()
    }
}

fn deliver(subscribers: &mut [Subscriber], event: &Event, queue: &mut EventQueue) {
    for sub in subscribers.iter_mut() {
        if sub.token.is_cancelled() {
            continue;
        }
        if let Err(err) = (sub.handler)(event, queue) {
            log::warn!(target: "bus", "handler failed for {:?}: {}", event.kind(), err);
        }
    }
}
