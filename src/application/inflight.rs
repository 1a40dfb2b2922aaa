//! Deduplication of concurrent async work by key.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Map of running operations keyed by `K`.
///
/// While an operation for a key is running, later callers with the same key
/// await the running one instead of starting their own. The entry is removed
/// once the operation finishes, so the next call after completion runs again.
pub struct InFlight<K, V>
where
    V: Clone,
{
    running: Mutex<HashMap<K, Shared<BoxFuture<'static, V>>>>,
}

impl<K, V> InFlight<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            running: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Shared<BoxFuture<'static, V>>>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `start()` unless an operation for `key` is already running, in
    /// which case its result is shared.
    pub async fn run<F, Fut>(&self, key: K, start: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let shared = {
            let mut running = self.lock();
            match running.get(&key) {
                Some(existing) => {
                    tracing::debug!("Joining in-flight operation {:?}", key);
                    existing.clone()
                }
                None => {
                    let fut = start().boxed().shared();
                    running.insert(key.clone(), fut.clone());
                    fut
                }
            }
        };

        let output = shared.clone().await;

        let mut running = self.lock();
        if running
            .get(&key)
            .is_some_and(|current| Shared::ptr_eq(current, &shared))
        {
            running.remove(&key);
        }

        output
    }

    /// Number of operations currently running
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for InFlight<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
