use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use tracing::{trace, warn};

use crate::context::StoreContext;
use crate::error::Result;
use crate::path::Path;
use crate::store::{Store, StoreRef, SubscriptionId};
use crate::validate::{require_arity, require_paths};
use crate::value::Value;

/// Pure derivation over the values at a computation's dependency paths.
///
/// Receives the resolved values in path declaration order. The declared
/// `arity` must equal the number of dependency paths — a calculation may
/// only read the paths it declares, and the mismatch is caught at
/// construction time.
#[derive(Clone)]
pub struct Calc {
    arity: usize,
    func: Arc<dyn Fn(&[Value]) -> Value + Send + Sync>,
}

impl Calc {
    pub fn new<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            arity,
            func: Arc::new(func),
        }
    }

    /// Number of dependency values this calculation reads.
    pub fn arity(&self) -> usize {
        self.arity
    }

    fn apply(&self, values: &[Value]) -> Value {
        (self.func)(values)
    }
}

impl fmt::Debug for Calc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calc")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Watch state shared between the handle and the store listener.
struct WatchState {
    last_values: Vec<Value>,
    /// Flips true → false exactly once, on cancellation.
    active: bool,
}

struct CalcCore {
    paths: Vec<Path>,
    calc: Calc,
    watch: Mutex<WatchState>,
}

/// A derived value recomputed whenever any of its declared state paths
/// changes, with the result delivered to a callback.
///
/// Constructing a calculation resolves the current dependency values but
/// invokes neither the calc function nor the callback — only a later
/// qualifying state change does. The handle cancels the subscription
/// ([`cancel`](Calculation::cancel)) or reads the derived value on demand
/// ([`value`](Calculation::value)). Dropping the handle does NOT cancel;
/// the store keeps the listener alive.
///
/// ```ignore
/// let calc = Calculation::new(
///     &ctx,
///     Calc::new(1, |values| values[0].clone()),
///     &["state.one"],
///     |result| println!("one is now {result}"),
/// )?;
/// // ... state changes fire the callback ...
/// calc.cancel();
/// ```
pub struct Calculation {
    core: Arc<CalcCore>,
    store: StoreRef,
    sub_id: SubscriptionId,
}

impl Calculation {
    /// Create a calculation against the context's default store.
    pub fn new<C>(
        ctx: &StoreContext,
        calc: Calc,
        paths: &[&str],
        callback: C,
    ) -> Result<Calculation>
    where
        C: Fn(&Value) + Send + Sync + 'static,
    {
        let store = ctx.resolve()?;
        Self::build(&store, calc, paths, callback)
    }

    /// Create a calculation against an explicit store, bypassing the
    /// context default.
    pub fn with_store<C>(
        store: &StoreRef,
        calc: Calc,
        paths: &[&str],
        callback: C,
    ) -> Result<Calculation>
    where
        C: Fn(&Value) + Send + Sync + 'static,
    {
        Self::build(store, calc, paths, callback)
    }

    fn build<C>(store: &StoreRef, calc: Calc, paths: &[&str], callback: C) -> Result<Calculation>
    where
        C: Fn(&Value) + Send + Sync + 'static,
    {
        // Eager validation, all of it before the subscription exists.
        require_paths(paths)?;
        require_arity(calc.arity(), paths.len())?;

        let state = store.state();
        let mut compiled = Vec::with_capacity(paths.len());
        let mut seed_values = Vec::with_capacity(paths.len());
        for path in paths {
            let path = Path::compile(path)?;
            seed_values.push(path.get(&state)?);
            compiled.push(path);
        }

        let core = Arc::new(CalcCore {
            paths: compiled,
            calc,
            watch: Mutex::new(WatchState {
                last_values: seed_values,
                active: true,
            }),
        });

        // The listener holds the store weakly; the store owns the
        // listener, and a strong reference back would leak both.
        let weak_store: Weak<dyn Store> = Arc::downgrade(store);
        let listener_core = Arc::clone(&core);
        let sub_id = store.subscribe(Arc::new(move || {
            let Some(store) = weak_store.upgrade() else {
                return;
            };
            notify(&listener_core, &store, &callback);
        }));

        Ok(Calculation {
            core,
            store: Arc::clone(store),
            sub_id,
        })
    }

    /// Permanently detach from the store. Idempotent: the first call
    /// flips the subscription inactive and unsubscribes; later calls do
    /// nothing. After cancellation no state change can reach the calc
    /// function or the callback.
    pub fn cancel(&self) {
        {
            let mut watch = self.core.watch.lock().unwrap();
            if !watch.active {
                return;
            }
            watch.active = false;
        }
        self.store.unsubscribe(self.sub_id);
        trace!("calculation cancelled");
    }

    /// Resolve the current dependency values and return the calc
    /// function applied to them, without touching the callback or the
    /// change-tracking state.
    pub fn value(&self) -> Result<Value> {
        let state = self.store.state();
        let mut values = Vec::with_capacity(self.core.paths.len());
        for path in &self.core.paths {
            values.push(path.get(&state)?);
        }
        Ok(self.core.calc.apply(&values))
    }
}

impl fmt::Debug for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calculation")
            .field("paths", &self.core.paths)
            .field("active", &self.core.watch.lock().unwrap().active)
            .finish_non_exhaustive()
    }
}

/// One change-notification turn: re-resolve, diff, conditionally run
/// calc then callback — in that order, synchronously.
fn notify<C>(core: &Arc<CalcCore>, store: &Arc<dyn Store>, callback: &C)
where
    C: Fn(&Value) + Send + Sync + 'static,
{
    let state = store.state();
    let new_values: Vec<Value> = core
        .paths
        .iter()
        .map(|path| match path.get(&state) {
            Ok(v) => v,
            Err(err) => {
                // A watched path can vanish if another reducer reshapes
                // the state; it reads as Null until it comes back.
                warn!(path = %path, %err, "watched path no longer resolves");
                Value::Null
            }
        })
        .collect();

    {
        let mut watch = core.watch.lock().unwrap();
        if !watch.active {
            return;
        }
        if new_values == watch.last_values {
            trace!("no watched value changed, skipping recompute");
            return;
        }
        watch.last_values = new_values.clone();
        // Lock released before user code runs: a callback that
        // re-dispatches must be able to re-enter this listener.
    }

    let derived = core.calc.apply(&new_values);
    callback(&derived);
}
