//! Memoizing cache of read results with family-wide invalidation.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

use super::key::{QueryFamily, QueryKey};
use crate::application::inflight::InFlight;
use crate::domain::{WalletError, WalletResult};

type CachedValue = Arc<dyn Any + Send + Sync>;

/// How long a stale entry stays peekable before it is dropped
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(5 * 60);

struct Entry {
    value: CachedValue,
    generation: u64,
    fetched_at: Instant,
}

#[derive(Default)]
struct State {
    entries: HashMap<QueryKey, Entry>,
    generations: HashMap<QueryFamily, u64>,
}

impl State {
    fn generation(&self, family: QueryFamily) -> u64 {
        self.generations.get(&family).copied().unwrap_or(0)
    }
}

/// Key-indexed cache of async read results.
///
/// Every family has a generation counter. Invalidating a family bumps it,
/// which makes all of its entries stale at once while keeping their values
/// available through [`QueryCache::peek`]. A load only stores its result if
/// the generation it started under is still current, so a read racing with a
/// write never caches pre-write data.
///
/// Entries are dropped once they fall two generations behind their family,
/// and stale entries older than the cache time are swept on every store.
pub struct QueryCache {
    state: Mutex<State>,
    loads: InFlight<(QueryKey, u64), WalletResult<CachedValue>>,
    stale_after: Option<Duration>,
    cache_time: Duration,
    events: broadcast::Sender<QueryFamily>,
}

impl QueryCache {
    pub fn new(stale_after: Option<Duration>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(State::default()),
            loads: InFlight::new(),
            stale_after,
            cache_time: DEFAULT_CACHE_TIME,
            events,
        }
    }

    /// Keep stale entries peekable for `cache_time` instead of the default
    pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = cache_time;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &Entry, generation: u64) -> bool {
        entry.generation == generation
            && self
                .stale_after
                .map_or(true, |ttl| entry.fetched_at.elapsed() < ttl)
    }

    /// Drop stale entries fetched longer than the cache time ago
    fn sweep(&self, state: &mut State) {
        let State {
            entries,
            generations,
        } = state;
        let before = entries.len();
        entries.retain(|key, entry| {
            let generation = generations.get(&key.family()).copied().unwrap_or(0);
            self.is_fresh(entry, generation) || entry.fetched_at.elapsed() < self.cache_time
        });
        let dropped = before - entries.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} expired query results", dropped);
        }
    }

    /// Return the cached value of `key`, or run `load` and cache its result.
    ///
    /// Concurrent calls for the same key and generation share one load.
    /// Errors are returned to every waiter and never cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, load: F) -> WalletResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = WalletResult<T>> + Send + 'static,
    {
        let family = key.family();
        let generation = {
            let state = self.lock();
            let generation = state.generation(family);
            if let Some(entry) = state.entries.get(&key) {
                if self.is_fresh(entry, generation) {
                    if let Some(value) = entry.value.downcast_ref::<T>() {
                        return Ok(value.clone());
                    }
                }
            }
            generation
        };

        let value = self
            .loads
            .run((key.clone(), generation), move || {
                let fut = load();
                async move { fut.await.map(|v| Arc::new(v) as CachedValue) }
            })
            .await?;

        {
            let mut state = self.lock();
            if state.generation(family) == generation {
                self.sweep(&mut state);
                state.entries.insert(
                    key.clone(),
                    Entry {
                        value: value.clone(),
                        generation,
                        fetched_at: Instant::now(),
                    },
                );
            } else {
                tracing::debug!("Discarding result of {:?} loaded before invalidation", key);
            }
        }

        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| WalletError::Cache(format!("unexpected value type for {:?}", key)))
    }

    /// Last value stored for `key`, stale or not
    pub fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.lock()
            .entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    /// Whether `key` would be re-fetched on its next read
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        let state = self.lock();
        let generation = state.generation(key.family());
        match state.entries.get(key) {
            Some(entry) => !self.is_fresh(entry, generation),
            None => true,
        }
    }

    /// Mark every entry of `family` stale and notify subscribers.
    ///
    /// Entries that were already stale before this call and never re-read
    /// are dropped; the latest stale value of each key stays peekable.
    pub fn invalidate(&self, family: QueryFamily) {
        {
            let mut state = self.lock();
            let generation = state.generations.entry(family).or_insert(0);
            *generation += 1;
            let current = *generation;
            state
                .entries
                .retain(|key, entry| key.family() != family || entry.generation + 1 >= current);
        }
        tracing::debug!("Invalidated query family {}", family);
        // No subscribers is fine
        let _ = self.events.send(family);
    }

    pub fn invalidate_all(&self, families: &[QueryFamily]) {
        for family in families {
            self.invalidate(*family);
        }
    }

    /// Invalidation events, one per invalidated family
    pub fn subscribe(&self) -> broadcast::Receiver<QueryFamily> {
        self.events.subscribe()
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user_key(id: &str) -> QueryKey {
        QueryKey::User {
            user_id: id.to_string(),
        }
    }

    fn counting_load(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = WalletResult<String>> + Send>> {
        let calls = calls.clone();
        move || {
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(value.to_string())
            })
        }
    }

    #[tokio::test]
    async fn test_second_read_hits_cache() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let a: String = cache.fetch(user_key("u1"), counting_load(&calls, "alice")).await.unwrap();
        let b: String = cache.fetch(user_key("u1"), counting_load(&calls, "bob")).await.unwrap();

        assert_eq!(a, "alice");
        assert_eq!(b, "alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_load() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.fetch::<String, _, _>(user_key("u1"), counting_load(&calls, "alice")),
            cache.fetch::<String, _, _>(user_key("u1"), counting_load(&calls, "alice")),
        );

        assert_eq!(a.unwrap(), "alice");
        assert_eq!(b.unwrap(), "alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_marks_whole_family_stale_but_keeps_values() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let _: String = cache.fetch(user_key("u1"), counting_load(&calls, "alice")).await.unwrap();
        let _: String = cache.fetch(user_key("u2"), counting_load(&calls, "bob")).await.unwrap();
        let _: String = cache
            .fetch(QueryKey::Fiats, counting_load(&calls, "usd"))
            .await
            .unwrap();

        cache.invalidate(QueryFamily::User);

        assert!(cache.is_stale(&user_key("u1")));
        assert!(cache.is_stale(&user_key("u2")));
        assert!(!cache.is_stale(&QueryKey::Fiats));
        assert_eq!(cache.peek::<String>(&user_key("u1")).as_deref(), Some("alice"));

        let refreshed: String = cache
            .fetch(user_key("u1"), counting_load(&calls, "alice v2"))
            .await
            .unwrap();
        assert_eq!(refreshed, "alice v2");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_value() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let _: String = cache.fetch(user_key("u1"), counting_load(&calls, "alice")).await.unwrap();

        cache.invalidate(QueryFamily::User);
        let err = cache
            .fetch::<String, _, _>(user_key("u1"), || async {
                Err(WalletError::NotFound("u1".into()))
            })
            .await;

        assert!(err.is_err());
        assert_eq!(cache.peek::<String>(&user_key("u1")).as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_load_started_before_invalidation_is_not_cached() {
        let cache = Arc::new(QueryCache::default());
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch::<String, _, _>(user_key("u1"), move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok("before write".to_string())
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.invalidate(QueryFamily::User);
        release_tx.send(()).unwrap();

        assert_eq!(reader.await.unwrap().unwrap(), "before write");
        assert!(cache.peek::<String>(&user_key("u1")).is_none());
        assert!(cache.is_stale(&user_key("u1")));
    }

    #[tokio::test]
    async fn test_invalidation_is_broadcast() {
        let cache = QueryCache::default();
        let mut events = cache.subscribe();
        cache.invalidate_all(&[QueryFamily::Asset, QueryFamily::Fiat]);
        assert_eq!(events.recv().await.unwrap(), QueryFamily::Asset);
        assert_eq!(events.recv().await.unwrap(), QueryFamily::Fiat);
    }

    #[tokio::test]
    async fn test_one_off_keys_do_not_accumulate_across_invalidations() {
        let cache = QueryCache::default();

        for i in 0..1000u32 {
            let key = QueryKey::Ticker {
                asset_id: "btc".to_string(),
                at: Some(format!("t{}", i)),
            };
            let value = cache
                .fetch::<u32, _, _>(key, move || async move { Ok(i) })
                .await
                .unwrap();
            assert_eq!(value, i);
            cache.invalidate(QueryFamily::Ticker);
        }

        assert!(cache.len() <= 2, "cache grew to {}", cache.len());
    }

    #[tokio::test]
    async fn test_value_is_peekable_for_one_invalidation_only() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let _: String = cache.fetch(user_key("u1"), counting_load(&calls, "alice")).await.unwrap();

        cache.invalidate(QueryFamily::User);
        assert_eq!(cache.peek::<String>(&user_key("u1")).as_deref(), Some("alice"));

        cache.invalidate(QueryFamily::User);
        assert!(cache.peek::<String>(&user_key("u1")).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entries_are_swept_after_cache_time() {
        let cache = QueryCache::new(Some(Duration::from_millis(100)))
            .with_cache_time(Duration::from_secs(1));
        let calls = Arc::new(AtomicUsize::new(0));

        for id in ["u1", "u2", "u3"] {
            let _: String = cache.fetch(user_key(id), counting_load(&calls, "x")).await.unwrap();
        }
        assert_eq!(cache.len(), 3);

        tokio::time::advance(Duration::from_secs(2)).await;
        let _: String = cache.fetch(user_key("u4"), counting_load(&calls, "y")).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.peek::<String>(&user_key("u1")).is_none());
    }

    #[tokio::test]
    async fn test_fresh_entries_survive_sweeps() {
        let cache = QueryCache::default().with_cache_time(Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));

        let _: String = cache.fetch(user_key("u1"), counting_load(&calls, "a")).await.unwrap();
        let _: String = cache.fetch(user_key("u2"), counting_load(&calls, "b")).await.unwrap();

        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_stale_time() {
        let cache = QueryCache::new(Some(Duration::from_millis(100)));
        let calls = Arc::new(AtomicUsize::new(0));

        let _: String = cache.fetch(user_key("u1"), counting_load(&calls, "alice")).await.unwrap();
        assert!(!cache.is_stale(&user_key("u1")));

        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(cache.is_stale(&user_key("u1")));

        let _: String = cache.fetch(user_key("u1"), counting_load(&calls, "alice")).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
