//! Minimal dispatch/reduce container for integration tests.
//!
//! Implements the [`Store`] boundary the way a conforming host would:
//! dispatch consults the trigger registry for the next state, swaps it
//! in, then synchronously notifies every listener.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use reflux::{Action, Listener, Store, StoreRef, SubscriptionId, TriggerRegistry, Value};

pub struct TestStore {
    state: RwLock<Value>,
    registry: TriggerRegistry,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl TestStore {
    pub fn new(initial: Value) -> StoreRef {
        Arc::new(Self {
            state: RwLock::new(initial),
            registry: TriggerRegistry::new(),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }
}

impl Store for TestStore {
    fn state(&self) -> Value {
        self.state.read().unwrap().clone()
    }

    fn dispatch(&self, action: Action) {
        // Snapshot first so reducers can read the store without
        // re-entering the state lock.
        let state = self.state.read().unwrap().clone();
        let next = self.registry.reduce(&state, &action);
        *self.state.write().unwrap() = next;

        // Snapshot so listeners may subscribe/cancel during notification.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.write().unwrap().retain(|(i, _)| *i != id);
    }

    fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }
}
