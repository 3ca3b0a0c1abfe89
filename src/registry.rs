use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::path::Path;
use crate::store::Action;
use crate::trigger::Reducer;
use crate::value::Value;

/// Per-action-type record inserted by a change trigger on its first call.
///
/// The compiled focus [`Path`] carries both accessors: `Path::get` reads
/// the focused sub-state and `Path::set` writes it back.
#[derive(Clone)]
pub struct TriggerRegistration {
    pub reducer: Reducer,
    pub focus: Option<Path>,
}

/// Insert-only table of trigger registrations, keyed by action type.
///
/// Owned by the store; this library inserts entries and the store's
/// reducer consults them via [`TriggerRegistry::reduce`]. Entries are
/// never removed, only replaced.
pub struct TriggerRegistry {
    entries: RwLock<HashMap<String, TriggerRegistration>>,
}

impl TriggerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert (or replace) the registration for an action type.
    ///
    /// Returns true if the action type was not registered before.
    pub fn register(&self, action_kind: &str, registration: TriggerRegistration) -> bool {
        let mut entries = self.entries.write().unwrap();
        let inserted = entries
            .insert(action_kind.to_string(), registration)
            .is_none();
        debug!(action = action_kind, new = inserted, "trigger registered");
        inserted
    }

    /// True if a registration exists for the action type.
    pub fn contains(&self, action_kind: &str) -> bool {
        self.entries.read().unwrap().contains_key(action_kind)
    }

    /// Number of registered action types.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// True if no action type is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reduce step for registered action types; the store's own reducer
    /// delegates here.
    ///
    /// Unregistered action types leave the state unchanged. With a focus
    /// path, the reducer sees only the focused sub-state and its return
    /// value is written back at that location; a focus that no longer
    /// resolves (the state changed shape since registration) also leaves
    /// the state unchanged, with a warning.
    pub fn reduce(&self, state: &Value, action: &Action) -> Value {
        let registration = {
            let entries = self.entries.read().unwrap();
            match entries.get(&action.kind) {
                Some(r) => r.clone(),
                None => return state.clone(),
            }
        };

        match &registration.focus {
            None => registration.reducer.apply(state, &action.payload, action),
            Some(focus) => {
                let focused = match focus.get(state) {
                    Ok(v) => v,
                    Err(err) => {
                        warn!(action = %action.kind, %err, "focus path no longer resolves, skipping reduce");
                        return state.clone();
                    }
                };
                let next = registration.reducer.apply(&focused, &action.payload, action);
                match focus.set(next, state) {
                    Ok(root) => root,
                    Err(err) => {
                        warn!(action = %action.kind, %err, "focus write-back failed, skipping reduce");
                        state.clone()
                    }
                }
            }
        }
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
