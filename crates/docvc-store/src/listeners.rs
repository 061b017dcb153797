//! Synchronous observer registry.
//!
//! Listeners are called in registration order. Every fan-out iterates over a
//! snapshot of the registry taken before the first call, so listeners added
//! or removed while an event is being delivered only affect later events.

use std::fmt;
use std::sync::Arc;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered set of listeners for events of type `E`.
pub struct ListenerRegistry<E: ?Sized> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E: ?Sized> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register a listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let listener: Listener<E> = Arc::new(listener);
        self.entries.push((id, listener));
        id
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// The current listeners, in registration order.
    pub fn snapshot(&self) -> Vec<Listener<E>> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    /// Deliver `event` to every listener registered at the time of the call.
    pub fn emit(&self, event: &E) {
        for listener in self.snapshot() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: ?Sized> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &self.entries.len())
            .finish()
    }
}
