use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::context::StoreContext;
use crate::error::Result;
use crate::path::Path;
use crate::registry::TriggerRegistration;
use crate::store::{Action, StoreRef};
use crate::validate::{require_arity, require_non_blank};
use crate::value::Value;

/// Reducer logic for one action type.
///
/// The function receives the state (or the focused sub-state, when the
/// owning trigger has a focus path), the positional payload values in
/// call order, and the full action, and returns the next state. A
/// closure has no inspectable parameter count, so the payload arity is
/// declared explicitly and checked against every trigger call.
#[derive(Clone)]
pub struct Reducer {
    payload_arity: usize,
    func: Arc<dyn Fn(&Value, &[Value], &Action) -> Value + Send + Sync>,
}

impl Reducer {
    pub fn new<F>(payload_arity: usize, func: F) -> Self
    where
        F: Fn(&Value, &[Value], &Action) -> Value + Send + Sync + 'static,
    {
        Self {
            payload_arity,
            func: Arc::new(func),
        }
    }

    /// Number of payload arguments every call must supply.
    pub fn payload_arity(&self) -> usize {
        self.payload_arity
    }

    pub(crate) fn apply(&self, state: &Value, payload: &[Value], action: &Action) -> Value {
        (self.func)(state, payload, action)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer")
            .field("payload_arity", &self.payload_arity)
            .finish_non_exhaustive()
    }
}

/// What a trigger call produced: the dispatched action and the store's
/// state immediately after dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOutcome {
    pub action: Action,
    pub state: Value,
}

/// One-shot registration state machine: flips forward exactly once, on
/// the first call that passes validation.
#[derive(Debug, PartialEq, Eq)]
enum RegistrationState {
    Unregistered,
    Registered,
}

/// A callable reducer-plus-dispatcher bound to one action type.
///
/// Owns the reducer logic for its action type and lazily registers it
/// with the store's trigger registry on the first call; every call
/// dispatches exactly one action.
///
/// ```ignore
/// let change_one = ChangeTrigger::new(
///     "CHANGE_ONE",
///     Reducer::new(0, |state, _, _| {
///         Path::compile("one").unwrap().set(Value::from("ONE"), state).unwrap()
///     }),
/// )?;
///
/// let outcome = change_one.call(&ctx, &[])?;
/// assert_eq!(outcome.state.get("one").unwrap().as_str(), Some("ONE"));
/// ```
pub struct ChangeTrigger {
    action_kind: String,
    reducer: Reducer,
    focus_path: Option<String>,
    registration: Mutex<RegistrationState>,
}

impl ChangeTrigger {
    /// Create a trigger for `action_kind` reducing the whole state.
    ///
    /// Fails eagerly with [`Error::EmptyValue`](crate::Error::EmptyValue)
    /// if `action_kind` is empty or whitespace-only.
    pub fn new(action_kind: impl Into<String>, reducer: Reducer) -> Result<Self> {
        Self::build(action_kind.into(), reducer, None)
    }

    /// Create a trigger whose reducer is scoped to a focus sub-path.
    ///
    /// The focus path is validated against the store's actual state on
    /// the first call, not here — only its shape is checked eagerly.
    pub fn with_focus(
        action_kind: impl Into<String>,
        reducer: Reducer,
        focus_path: impl Into<String>,
    ) -> Result<Self> {
        Self::build(action_kind.into(), reducer, Some(focus_path.into()))
    }

    fn build(action_kind: String, reducer: Reducer, focus_path: Option<String>) -> Result<Self> {
        require_non_blank("actionType", &action_kind)?;
        if let Some(focus) = &focus_path {
            require_non_blank("focusPath", focus)?;
        }
        Ok(Self {
            action_kind,
            reducer,
            focus_path,
            registration: Mutex::new(RegistrationState::Unregistered),
        })
    }

    /// The action type this trigger dispatches.
    pub fn action_kind(&self) -> &str {
        &self.action_kind
    }

    /// Call the trigger against the context's default store.
    ///
    /// Fails with [`Error::MissingStore`](crate::Error::MissingStore)
    /// when the context has no default installed.
    pub fn call(&self, ctx: &StoreContext, payload: &[Value]) -> Result<ChangeOutcome> {
        let store = ctx.resolve()?;
        self.dispatch_to(&store, payload)
    }

    /// Call the trigger against an explicit store, bypassing the
    /// context default.
    pub fn call_with(&self, store: &StoreRef, payload: &[Value]) -> Result<ChangeOutcome> {
        self.dispatch_to(store, payload)
    }

    fn dispatch_to(&self, store: &StoreRef, payload: &[Value]) -> Result<ChangeOutcome> {
        // All checks run before any side effect: a failed call never
        // dispatches and never half-registers.
        require_arity(self.reducer.payload_arity(), payload.len())?;
        self.ensure_registered(store)?;

        let action = Action::new(self.action_kind.clone(), payload.to_vec());
        debug!(action = %self.action_kind, payload = payload.len(), "dispatching");
        store.dispatch(action.clone());

        Ok(ChangeOutcome {
            action,
            state: store.state(),
        })
    }

    /// Register with the store's trigger registry on the first
    /// successful call; later calls skip straight past.
    fn ensure_registered(&self, store: &StoreRef) -> Result<()> {
        let mut registration = self.registration.lock().unwrap();
        if *registration == RegistrationState::Registered {
            return Ok(());
        }

        let focus = match &self.focus_path {
            None => None,
            Some(path) => {
                let compiled = Path::compile(path)?;
                // Eager check: the focus must exist in the current state,
                // otherwise the first change would fail much later.
                compiled.get(&store.state())?;
                Some(compiled)
            }
        };

        store.registry().register(
            &self.action_kind,
            TriggerRegistration {
                reducer: self.reducer.clone(),
                focus,
            },
        );
        *registration = RegistrationState::Registered;
        Ok(())
    }
}

impl fmt::Debug for ChangeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTrigger")
            .field("action_kind", &self.action_kind)
            .field("focus_path", &self.focus_path)
            .finish_non_exhaustive()
    }
}
