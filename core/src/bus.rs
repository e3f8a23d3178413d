//! Per-match publish/subscribe registry keyed by event kind.

use std::collections::BTreeMap;

use crate::{Event, EventKind};

/// Token returned by [`EventBus::on`] and accepted by [`EventBus::off`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Retrieves the numeric representation of the token.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

type Handler = Box<dyn FnMut(&Event)>;

/// Synchronous event bus owned by a single match.
///
/// Handlers run in registration order during [`EventBus::emit`]; nothing is
/// queued. Because emission borrows the bus mutably, a handler cannot emit
/// back into the bus that is delivering to it.
#[derive(Default)]
pub struct EventBus {
    handlers: BTreeMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let handler: Handler = Box::new(handler);
        self.handlers.entry(kind).or_default().push((id, handler));
        id
    }

    /// Removes a previously registered handler, reporting whether it existed.
    pub fn off(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        let Some(handlers) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            let _ = self.handlers.remove(&kind);
        }
        removed
    }

    /// Delivers `event` to every handler subscribed to its kind.
    pub fn emit(&mut self, event: &Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Clears the handlers of one kind, or of every kind when `kind` is `None`.
    pub fn remove_all_listeners(&mut self, kind: Option<EventKind>) {
        match kind {
            Some(kind) => {
                let _ = self.handlers.remove(&kind);
            }
            None => self.handlers.clear(),
        }
    }

    /// Number of handlers subscribed to `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<EventKind, usize> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("handlers", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn wave_completed(wave: u32) -> Event {
        Event::WaveCompleted {
            wave,
            bonus_gold: 0,
        }
    }

    #[test]
    fn handlers_fire_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            let _ = bus.on(EventKind::WaveCompleted, move |_| {
                log.borrow_mut().push(label);
            });
        }
        bus.emit(&wave_completed(1));

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn emit_only_reaches_matching_kind() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let _ = bus.on(EventKind::GameOver, move |_| *counter.borrow_mut() += 1);

        bus.emit(&wave_completed(2));
        assert_eq!(*hits.borrow(), 0);

        bus.emit(&Event::GameOver {
            score: 10,
            essence: 1,
        });
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn off_removes_only_the_given_handler() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first_log = Rc::clone(&log);
        let second_log = Rc::clone(&log);
        let first = bus.on(EventKind::WaveCompleted, move |_| {
            first_log.borrow_mut().push(1);
        });
        let _ = bus.on(EventKind::WaveCompleted, move |_| {
            second_log.borrow_mut().push(2);
        });

        assert!(bus.off(EventKind::WaveCompleted, first));
        assert!(!bus.off(EventKind::WaveCompleted, first));
        bus.emit(&wave_completed(3));

        assert_eq!(*log.borrow(), vec![2]);
        assert_eq!(bus.listener_count(EventKind::WaveCompleted), 1);
    }

    #[test]
    fn remove_all_listeners_clears_one_or_every_kind() {
        let mut bus = EventBus::new();
        let _ = bus.on(EventKind::WaveCompleted, |_| {});
        let _ = bus.on(EventKind::GameOver, |_| {});
        let _ = bus.on(EventKind::GameOver, |_| {});

        bus.remove_all_listeners(Some(EventKind::GameOver));
        assert_eq!(bus.listener_count(EventKind::GameOver), 0);
        assert_eq!(bus.listener_count(EventKind::WaveCompleted), 1);

        bus.remove_all_listeners(None);
        assert_eq!(bus.listener_count(EventKind::WaveCompleted), 0);
    }
}
