//! Typed event queue for decoupled component communication.
//!
//! Widgets and background jobs emit; the app loop polls once per frame and
//! dispatches by downcast. Emitter handles are cheap clones and may cross
//! thread boundaries (worker closures report results through them).

use std::any::Any;
use std::sync::{Arc, Mutex};

/// Marker trait for events. Events must be Send + Sync + 'static.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

// Blanket impl for all qualifying types
impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

/// Queue-based event bus: emit anywhere, poll in the main loop.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Arc<Mutex<Vec<BoxedEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next poll.
    pub fn emit<E: Event>(&self, event: E) {
        log::trace!("emit: {}", event.type_name());
        self.queue.lock().expect("event queue lock").push(Box::new(event));
    }

    /// Drain all queued events, in emission order. Use in the main loop:
    /// ```ignore
    /// for event in event_bus.poll() {
    ///     if let Some(e) = downcast_event::<ParamsChangedEvent>(&event) { ... }
    /// }
    /// ```
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().expect("event queue lock"))
    }

    /// Get an emitter handle for passing to UI components and workers.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            queue: Arc::clone(&self.queue),
        }
    }
}

/// Cloneable, thread-safe handle that can only emit.
#[derive(Clone)]
pub struct EventEmitter {
    queue: Arc<Mutex<Vec<BoxedEvent>>>,
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        log::trace!("emit: {}", event.type_name());
        self.queue.lock().expect("event queue lock").push(Box::new(event));
    }
}

/// Downcast a polled event to a concrete type.
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    event.as_any().downcast_ref::<E>()
}
