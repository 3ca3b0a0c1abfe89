use std::fmt;
use std::sync::Arc;

use crate::registry::TriggerRegistry;
use crate::value::Value;

/// A dispatched state-transition request: tag plus positional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Action type string, matching the trigger registry key.
    pub kind: String,
    /// Positional payload arguments, in call order.
    pub payload: Vec<Value>,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: Vec<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Change-notification callback registered with [`Store::subscribe`].
///
/// Takes no arguments — subscribers read the new state back through the
/// store, which already holds it when notification runs.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Unique handle for a store subscription, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Shared handle to a store instance.
///
/// Passing a `StoreRef` is the only way to supply a store override, so
/// "is this argument a store?" is decided by the type system rather than
/// by sniffing a marker property on an arbitrary object.
pub type StoreRef = Arc<dyn Store>;

/// The external state-container boundary.
///
/// The container itself — creation, reducer composition, the
/// dispatch/notify loop — lives outside this library. A conforming
/// implementation must, inside [`dispatch`](Store::dispatch):
///
/// 1. produce the next state by consulting its reducers, delegating
///    registered action types to [`TriggerRegistry::reduce`];
/// 2. swap the held state for the new value (never edit in place);
/// 3. synchronously notify every subscribed [`Listener`] before
///    returning.
pub trait Store: Send + Sync {
    /// Current state snapshot. Cheap: container clones are Arc bumps.
    fn state(&self) -> Value;

    /// Dispatch an action, synchronously reducing and notifying.
    fn dispatch(&self, action: Action);

    /// Register a change listener, called after every dispatch that
    /// completed a reduce step.
    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    /// Remove a previously registered listener. Unknown ids are a no-op.
    fn unsubscribe(&self, id: SubscriptionId);

    /// The trigger registry this store's reducer consults.
    fn registry(&self) -> &TriggerRegistry;
}

impl fmt::Debug for dyn Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
