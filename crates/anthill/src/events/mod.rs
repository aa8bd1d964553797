//! Listener registries for synchronous, in-place event delivery
//!
//! Key principles:
//! - Registration returns a stable [`ListenerId`] used to unsubscribe
//! - Delivery is immediate; there is no queue between `emit` and the handlers
//! - Handlers may subscribe, unsubscribe or emit again while being notified

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned by [`EventListeners::subscribe`]
    pub struct ListenerId;
}

type Handler<E> = Rc<dyn Fn(&E)>;

/// Registry of handlers for one event type
pub struct EventListeners<E> {
    handlers: RefCell<SlotMap<ListenerId, Handler<E>>>,
}

impl<E> EventListeners<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(SlotMap::with_key()),
        }
    }

    /// Register a handler and return its handle
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> ListenerId {
        self.handlers.borrow_mut().insert(Rc::new(handler))
    }

    /// Remove a handler. Returns `false` if the handle was unknown.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.handlers.borrow_mut().remove(id).is_some()
    }

    /// Deliver `event` to every handler registered at the time of the call
    pub fn emit(&self, event: &E) {
        // Snapshot so handlers can touch the registry while we iterate.
        let handlers: Vec<Handler<E>> = self.handlers.borrow().values().cloned().collect();
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}

impl<E> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_all_handlers() {
        let listeners = EventListeners::<u32>::new();
        let total = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let total = Rc::clone(&total);
            listeners.subscribe(move |value| total.set(total.get() + *value));
        }

        listeners.emit(&2);
        assert_eq!(total.get(), 6);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners = EventListeners::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = listeners.subscribe(move |()| counter.set(counter.get() + 1));

        listeners.emit(&());
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.emit(&());

        assert_eq!(hits.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_handler_can_unsubscribe_during_emit() {
        let listeners = Rc::new(EventListeners::<()>::new());
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let registry = Rc::downgrade(&listeners);
        let own_id = Rc::clone(&slot);
        let id = listeners.subscribe(move |()| {
            if let (Some(registry), Some(id)) = (registry.upgrade(), own_id.get()) {
                registry.unsubscribe(id);
            }
        });
        slot.set(Some(id));

        listeners.emit(&());
        assert_eq!(listeners.len(), 0);
    }
}
