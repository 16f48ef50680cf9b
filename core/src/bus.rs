//! Synchronous, typed publish/subscribe channel for presentation reactions.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::{Event, EventKind};

/// Decision returned by a listener after handling an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listen {
    /// Keep receiving events.
    Continue,
    /// Remove this listener once the current emission finishes with it.
    Unsubscribe,
}

/// Handle identifying a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&Event) -> Listen>;

struct Listener {
    id: SubscriptionId,
    kind: EventKind,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    pending: RefCell<Vec<Listener>>,
    cancelled: RefCell<Vec<SubscriptionId>>,
}

impl Registry {
    fn allocate(&self) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        SubscriptionId(id)
    }

    fn enqueue(&self, kind: EventKind, callback: Callback) -> SubscriptionId {
        let id = self.allocate();
        self.pending.borrow_mut().push(Listener { id, kind, callback });
        id
    }
}

/// Event bus keyed by [`EventKind`].
///
/// Emission is synchronous and visits listeners in subscription order.
/// A listener removes itself by returning [`Listen::Unsubscribe`]. Listeners
/// that need to subscribe or unsubscribe others capture a [`BusHandle`];
/// changes made through it during an emission take effect once that
/// emission finishes.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    registry: Rc<Registry>,
}

impl EventBus {
    /// Creates a bus without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that can register listeners from inside a callback.
    #[must_use]
    pub fn handle(&self) -> BusHandle {
        BusHandle {
            registry: Rc::clone(&self.registry),
        }
    }

    /// Registers a listener for every event of `kind`.
    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> Listen + 'static,
    {
        self.settle();
        let id = self.registry.allocate();
        self.listeners.push(Listener {
            id,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Registers a listener that fires for the next event of `kind` only.
    pub fn once<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnOnce(&Event) + 'static,
    {
        self.subscribe(kind, one_shot(callback))
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.settle();
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Delivers `event` to every listener registered for its kind.
    pub fn emit(&mut self, event: &Event) {
        self.settle();
        let kind = event.kind();
        self.listeners.retain_mut(|listener| {
            if listener.kind != kind {
                return true;
            }
            (listener.callback)(event) == Listen::Continue
        });
        self.settle();
    }

    /// Applies subscriptions and cancellations queued through handles.
    fn settle(&mut self) {
        let cancelled = std::mem::take(&mut *self.registry.cancelled.borrow_mut());
        self.listeners.append(&mut self.registry.pending.borrow_mut());
        if !cancelled.is_empty() {
            self.listeners
                .retain(|listener| !cancelled.contains(&listener.id));
        }
    }

    /// Number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        let cancelled = self.registry.cancelled.borrow();
        self.listeners
            .iter()
            .chain(self.registry.pending.borrow().iter())
            .filter(|listener| listener.kind == kind && !cancelled.contains(&listener.id))
            .count()
    }
}

/// Shared registration handle for an [`EventBus`].
#[derive(Clone)]
pub struct BusHandle {
    registry: Rc<Registry>,
}

impl BusHandle {
    /// Queues a listener for every event of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> Listen + 'static,
    {
        self.registry.enqueue(kind, Box::new(callback))
    }

    /// Queues a listener for the next event of `kind` only.
    pub fn once<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnOnce(&Event) + 'static,
    {
        self.registry.enqueue(kind, Box::new(one_shot(callback)))
    }

    /// Queues the removal of a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.registry.cancelled.borrow_mut().push(id);
    }
}

impl fmt::Debug for BusHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusHandle")
            .field("pending", &self.registry.pending.borrow().len())
            .finish()
    }
}

fn one_shot<F>(callback: F) -> impl FnMut(&Event) -> Listen
where
    F: FnOnce(&Event),
{
    let mut pending = Some(callback);
    move |event| {
        if let Some(callback) = pending.take() {
            callback(event);
        }
        Listen::Unsubscribe
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.registry.next_id.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold(total: u32) -> Event {
        Event::GoldChanged {
            amount: 1,
            total,
        }
    }

    #[test]
    fn listeners_receive_only_their_kind() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _ = bus.subscribe(EventKind::GoldChanged, move |event| {
            sink.borrow_mut().push(event.clone());
            Listen::Continue
        });

        bus.emit(&gold(5));
        bus.emit(&Event::GameOver);
        bus.emit(&gold(6));

        assert_eq!(*seen.borrow(), vec![gold(5), gold(6)]);
    }

    #[test]
    fn once_fires_a_single_time() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let _ = bus.once(EventKind::GameOver, move |_| *sink.borrow_mut() += 1);

        bus.emit(&Event::GameOver);
        bus.emit(&Event::GameOver);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(EventKind::GameOver), 0);
    }

    #[test]
    fn listener_can_unsubscribe_itself_during_emission() {
        let mut bus = EventBus::new();
        let first = Rc::new(RefCell::new(0));
        let second = Rc::new(RefCell::new(0));
        let first_sink = Rc::clone(&first);
        let second_sink = Rc::clone(&second);
        let _ = bus.subscribe(EventKind::GoldChanged, move |_| {
            *first_sink.borrow_mut() += 1;
            Listen::Unsubscribe
        });
        let _ = bus.subscribe(EventKind::GoldChanged, move |_| {
            *second_sink.borrow_mut() += 1;
            Listen::Continue
        });

        bus.emit(&gold(1));
        bus.emit(&gold(2));

        assert_eq!(*first.borrow(), 1);
        assert_eq!(*second.borrow(), 2, "later listeners still run");
    }

    #[test]
    fn unsubscribe_reports_whether_listener_existed() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(EventKind::Victory, |_| Listen::Continue);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn listener_can_subscribe_another_during_emission() {
        let mut bus = EventBus::new();
        let handle = bus.handle();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _ = bus.once(EventKind::StageStart, move |_| {
            let sink = Rc::clone(&sink);
            let _ = handle.subscribe(EventKind::StageStart, move |event| {
                sink.borrow_mut().push(event.clone());
                Listen::Continue
            });
        });

        let first = Event::StageStart {
            stage: crate::StageId::new(1),
        };
        let second = Event::StageStart {
            stage: crate::StageId::new(2),
        };
        bus.emit(&first);
        assert!(seen.borrow().is_empty(), "joins after the current emission");
        assert_eq!(bus.listener_count(EventKind::StageStart), 1);

        bus.emit(&second);
        assert_eq!(*seen.borrow(), vec![second]);
    }

    #[test]
    fn handle_unsubscribe_applies_after_emission() {
        let mut bus = EventBus::new();
        let handle = bus.handle();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let target = bus.subscribe(EventKind::GameOver, move |_| {
            *sink.borrow_mut() += 1;
            Listen::Continue
        });
        let _ = bus.subscribe(EventKind::GoldChanged, move |_| {
            handle.unsubscribe(target);
            Listen::Continue
        });

        bus.emit(&gold(1));
        bus.emit(&Event::GameOver);

        assert_eq!(*count.borrow(), 0);
        assert_eq!(bus.listener_count(EventKind::GameOver), 0);
    }
}
