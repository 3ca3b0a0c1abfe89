use std::sync::RwLock;

use tracing::debug;

use crate::error::{Error, Result};
use crate::store::StoreRef;

/// Explicit holder for the process-default store.
///
/// There is no implicit module-level global default: the
/// default store exists only inside a context object that the host
/// creates, installs into, passes to trigger/computation calls, and
/// tears down. A call site can always bypass the context by passing a
/// store explicitly (`call_with` / `with_store`).
pub struct StoreContext {
    default_store: RwLock<Option<StoreRef>>,
}

impl StoreContext {
    /// Create a context with no default store installed.
    pub fn new() -> Self {
        Self {
            default_store: RwLock::new(None),
        }
    }

    /// Create a context with `store` already installed as the default.
    pub fn with_default(store: StoreRef) -> Self {
        let ctx = Self::new();
        ctx.install(store);
        ctx
    }

    /// Install (or replace) the default store.
    pub fn install(&self, store: StoreRef) {
        *self.default_store.write().unwrap() = Some(store);
        debug!("default store installed");
    }

    /// Remove the default store. Subsequent calls that rely on the
    /// default fail with [`Error::MissingStore`].
    pub fn teardown(&self) {
        *self.default_store.write().unwrap() = None;
        debug!("default store removed");
    }

    /// The currently installed default store, if any.
    pub fn current(&self) -> Option<StoreRef> {
        self.default_store.read().unwrap().clone()
    }

    /// Resolve the effective store: the installed default, or
    /// [`Error::MissingStore`] when none is installed.
    pub fn resolve(&self) -> Result<StoreRef> {
        self.current().ok_or(Error::MissingStore)
    }
}

impl Default for StoreContext {
    fn default() -> Self {
        Self::new()
    }
}
