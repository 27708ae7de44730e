use std::cell::RefCell;

use crate::event::{EditorEvent, EventHandler};

/// Broadcasts editor events to registered handlers.
///
/// Handlers run synchronously while the surface is borrowed, so they must not
/// call back into the surface that emitted the event.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Emit an event to all registered handlers
    pub fn emit(&self, event: EditorEvent) {
        log::trace!("Emitting {event:?}");
        for handler in &mut *self.handlers.borrow_mut() {
            handler.handle_event(&event);
        }
    }

    /// Drops every handler
    pub fn clear(&self) {
        self.handlers.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn every_handler_sees_each_event() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            bus.subscribe(Box::new(move |_: &EditorEvent| {
                seen.fetch_add(1, Ordering::SeqCst);
            }));
        }
        bus.emit(EditorEvent::Disposed);
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        bus.clear();
        bus.emit(EditorEvent::Disposed);
        assert_eq!(bus.handler_count(), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
