//! Reflux — change triggers and computations over a dispatch/reduce store.
//!
//! Two reactive primitives layered on an external immutable-state
//! container (anything implementing the [`Store`] boundary):
//!
//! - [`ChangeTrigger`] — a callable unit owning the reducer logic for one
//!   action type, optionally scoped to a focus sub-path of state. It
//!   registers itself with the store's trigger registry on first call and
//!   dispatches exactly one action per call.
//! - [`Calculation`] — a derived value recomputed from a declared set of
//!   state paths, invoking a callback whenever any watched value changes,
//!   with an explicit cancellation handle.
//!
//! # Path Addressing
//!
//! State is a nested [`Value`]; paths use dot syntax with numeric or
//! bracketed segments for arrays: `"a.b.c"`, `"list.0.name"`,
//! `"list[0].name"`. A leading `state` root segment is accepted, so
//! `"state.one"` reads the root field `one`. Paths are validated eagerly
//! against the store's actual state when a trigger registers or a
//! calculation subscribes — never lazily at first change.
//!
//! # Example
//!
//! ```ignore
//! use reflux::{Calc, Calculation, ChangeTrigger, Path, Reducer, StoreContext, Value};
//!
//! let ctx = StoreContext::with_default(store);
//!
//! let change_one = ChangeTrigger::new(
//!     "CHANGE_ONE",
//!     Reducer::new(0, |state, _, _| {
//!         Path::compile("one").unwrap().set(Value::from("ONE"), state).unwrap()
//!     }),
//! )?;
//!
//! let watch_one = Calculation::new(
//!     &ctx,
//!     Calc::new(1, |values| values[0].clone()),
//!     &["state.one"],
//!     |result| println!("one is now {result}"),
//! )?;
//!
//! change_one.call(&ctx, &[])?;   // recomputes, then fires the callback
//! watch_one.cancel();            // detaches for good
//! ```
//!
//! # What lives outside
//!
//! The store itself — creation, reducer composition, the dispatch/notify
//! loop — is the host's. This library inserts trigger registrations into
//! the store's [`TriggerRegistry`] and the store's reducer delegates
//! registered action types to [`TriggerRegistry::reduce`].

pub mod calculation;
pub mod context;
pub mod error;
pub mod path;
pub mod registry;
pub mod store;
pub mod trigger;
pub mod validate;
pub mod value;

#[cfg(test)]
mod testutil;

// Re-export primary types at crate root.
pub use calculation::{Calc, Calculation};
pub use context::StoreContext;
pub use error::{Error, Result, error_code};
pub use path::Path;
pub use registry::{TriggerRegistration, TriggerRegistry};
pub use store::{Action, Listener, Store, StoreRef, SubscriptionId};
pub use trigger::{ChangeOutcome, ChangeTrigger, Reducer};
pub use value::Value;
