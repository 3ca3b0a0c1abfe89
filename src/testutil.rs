//! In-memory dispatch/reduce store used by unit tests.
//!
//! The library deliberately ships no state container; tests need one to
//! exercise the dispatch → reduce → notify loop end to end.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::registry::TriggerRegistry;
use crate::store::{Action, Listener, Store, StoreRef, SubscriptionId};
use crate::value::Value;

pub struct MemoryStore {
    state: RwLock<Value>,
    registry: TriggerRegistry,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new(initial: Value) -> StoreRef {
        Arc::new(Self {
            state: RwLock::new(initial),
            registry: TriggerRegistry::new(),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }
}

impl Store for MemoryStore {
    fn state(&self) -> Value {
        self.state.read().unwrap().clone()
    }

    fn dispatch(&self, action: Action) {
        // Snapshot first so reducers can read the store without
        // re-entering the state lock.
        let state = self.state.read().unwrap().clone();
        let next = self.registry.reduce(&state, &action);
        *self.state.write().unwrap() = next;

        // Snapshot listeners so a listener that subscribes or cancels
        // during notification does not deadlock on the lock.
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
