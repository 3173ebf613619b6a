//! Single-flight resource cache.
//!
//! [`ResourceCache`] coordinates loads of keyed resources: for any key at most
//! one load is in flight, every concurrent caller for that key awaits the same
//! load through a [`Shared`] future, and a successful result is kept until it
//! is explicitly invalidated. Failures are handed to every waiter and then
//! forgotten, so the next access starts a fresh load.
//!
//! The cache never fetches anything itself. Each call to
//! [`get`](ResourceCache::get) carries a loader, and only the loader of the
//! caller that finds the key empty is ever run.
//!
//! A loader that never settles stalls every waiter of its key for good. The
//! cache has no timeout of its own; bound the loader instead (for example with
//! an HTTP client timeout).

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt as _;
use tracing::{debug, trace, warn};

use super::CacheError;

type LoadOutcome<V> = Result<V, CacheError>;
type SharedLoad<V> = Shared<BoxFuture<'static, LoadOutcome<V>>>;

/// Observable state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Pending,
    Resolved,
    /// Resolved by a load that was invalidated while in flight. The value is
    /// still readable with `peek`, but the next `get` loads again.
    Stale,
}

/// Per-key entry. An absent key is `Empty`.
enum Slot<V> {
    Pending {
        generation: u64,
        load: SharedLoad<V>,
        /// Set by `invalidate` while loading: the outcome is still stored,
        /// but marked stale.
        invalidated: bool,
    },
    Resolved {
        value: V,
        cached_at: DateTime<Utc>,
        stale: bool,
    },
}

struct Inner<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    next_generation: AtomicU64,
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        // The map is only ever mutated by complete single-statement updates.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies the result of load `generation` to its slot.
    fn settle(&self, key: &K, generation: u64, outcome: &LoadOutcome<V>) {
        let mut slots = self.lock();
        let invalidated = match slots.get(key) {
            Some(Slot::Pending {
                generation: current,
                invalidated,
                ..
            }) if *current == generation => *invalidated,
            _ => return,
        };

        match outcome {
            Ok(value) => {
                if invalidated {
                    debug!(key = ?key, "Resource resolved after invalidation, stored as stale");
                } else {
                    debug!(key = ?key, "Resource resolved");
                }
                slots.insert(
                    key.clone(),
                    Slot::Resolved {
                        value: value.clone(),
                        cached_at: Utc::now(),
                        stale: invalidated,
                    },
                );
            }
            Err(err) => {
                warn!(key = ?key, error = %err, "Resource load failed");
                slots.remove(key);
            }
        }
    }
}

/// Process-wide store of keyed resources with request coalescing.
///
/// Clone is cheap: clones share the same entries, so one instance can be
/// handed to every consumer.
pub struct ResourceCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for ResourceCache<K, V> {
    fn clone(&self) -> Self {
        ResourceCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for ResourceCache<K, V> {
    fn default() -> Self {
        ResourceCache {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }
}

impl<K, V> Debug for ResourceCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (pending, resolved) = self
            .inner
            .slots
            .try_lock()
            .map(|slots| {
                slots.values().fold((0, 0), |(p, r), slot| match slot {
                    Slot::Pending { .. } => (p + 1, r),
                    Slot::Resolved { .. } => (p, r + 1),
                })
            })
            .unwrap_or_default();
        f.debug_struct("ResourceCache")
            .field("pending", &pending)
            .field("resolved", &resolved)
            .finish()
    }
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, loading it with `loader` at most once.
    ///
    /// - A resolved value is returned on the first poll and `loader` is dropped
    ///   without being called. A stale value is not returned; it is replaced
    ///   by a new load.
    /// - If a load for `key` is in flight, this call waits for it and returns
    ///   its outcome; `loader` is dropped without being called.
    /// - Otherwise `loader` is called exactly once and every caller that
    ///   arrives before it settles shares its outcome.
    ///
    /// A failed load is not cached: the error goes to every current waiter and
    /// the next call starts a new load.
    ///
    /// Dropping this future does not cancel the load while other callers are
    /// still waiting on it. If every caller goes away, the load stays parked
    /// in the cache and resumes when the key is next requested.
    pub async fn get<F, Fut, E>(&self, key: K, loader: F) -> Result<V, CacheError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<anyhow::Error> + Send + 'static,
    {
        let load = {
            let mut slots = self.inner.lock();
            match slots.get(&key) {
                Some(Slot::Resolved {
                    value,
                    stale: false,
                    ..
                }) => {
                    trace!(key = ?key, "Resource cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::Pending { load, .. }) => {
                    trace!(key = ?key, "Joining in-flight load");
                    load.clone()
                }
                Some(Slot::Resolved { stale: true, .. }) | None => {
                    let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                    debug!(key = ?key, generation, "Starting load");
                    let load = self.start_load(key.clone(), generation, loader);
                    slots.insert(
                        key,
                        Slot::Pending {
                            generation,
                            load: load.clone(),
                            invalidated: false,
                        },
                    );
                    load
                }
            }
        };

        load.await
    }

    /// Builds the shared load future. The loader runs on first poll, and the
    /// slot transition happens inside the future so it runs exactly once no
    /// matter which waiter drives it.
    fn start_load<F, Fut, E>(&self, key: K, generation: u64, loader: F) -> SharedLoad<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Into<anyhow::Error> + Send + 'static,
    {
        let inner: Weak<Inner<K, V>> = Arc::downgrade(&self.inner);

        async move {
            let outcome = match AssertUnwindSafe(async move { loader().await })
                .catch_unwind()
                .await
            {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(CacheError::load_failed(err)),
                Err(_) => Err(CacheError::LoaderPanicked),
            };

            if let Some(inner) = inner.upgrade() {
                inner.settle(&key, generation, &outcome);
            }
            outcome
        }
        .boxed()
        .shared()
    }

    /// Returns the resolved value for `key` without loading or waiting.
    /// A stale value is returned too, until the next `get` replaces it.
    pub fn peek(&self, key: &K) -> Option<V> {
        match self.inner.lock().get(key) {
            Some(Slot::Resolved { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    /// Discards the cached value for `key` so the next access reloads it.
    ///
    /// An in-flight load is not cancelled: its waiters still receive its
    /// outcome, and callers arriving before it settles still join it. A value
    /// it produces populates the cache as [`CacheStatus::Stale`]: `peek` sees
    /// it, and the next `get` loads again. Returns `false` if `key` was
    /// already empty.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut slots = self.inner.lock();
        match slots.get_mut(key) {
            Some(Slot::Resolved { .. }) => {
                debug!(key = ?key, "Invalidating resolved resource");
                slots.remove(key);
                true
            }
            Some(Slot::Pending { invalidated, .. }) => {
                debug!(key = ?key, "Invalidating in-flight resource");
                *invalidated = true;
                true
            }
            None => false,
        }
    }

    /// Invalidates every key.
    pub fn clear(&self) {
        let mut slots = self.inner.lock();
        slots.retain(|_, slot| match slot {
            Slot::Pending { invalidated, .. } => {
                *invalidated = true;
                true
            }
            Slot::Resolved { .. } => false,
        });
        debug!(pending = slots.len(), "Cleared resource cache");
    }

    pub fn status(&self, key: &K) -> CacheStatus {
        match self.inner.lock().get(key) {
            Some(Slot::Pending { .. }) => CacheStatus::Pending,
            Some(Slot::Resolved { stale: false, .. }) => CacheStatus::Resolved,
            Some(Slot::Resolved { stale: true, .. }) => CacheStatus::Stale,
            None => CacheStatus::Empty,
        }
    }

    /// When the value for `key` was stored, if it is resolved.
    pub fn cached_at(&self, key: &K) -> Option<DateTime<Utc>> {
        match self.inner.lock().get(key) {
            Some(Slot::Resolved { cached_at, .. }) => Some(*cached_at),
            _ => None,
        }
    }

    /// Number of keys that are pending or resolved.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use futures::future::join_all;
    use futures::FutureExt;
    use tokio::sync::oneshot;

    type TestCache = ResourceCache<&'static str, Arc<String>>;

    /// Loader that counts its invocations and settles immediately.
    fn counting_loader(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl FnOnce() -> futures::future::Ready<anyhow::Result<Arc<String>>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(Arc::new(value.to_string())))
        }
    }

    fn failing_loader(
        calls: &Arc<AtomicUsize>,
        message: &'static str,
    ) -> impl FnOnce() -> futures::future::Ready<anyhow::Result<Arc<String>>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Err(anyhow::anyhow!(message)))
        }
    }

    /// Loader that stays pending until the returned sender fires.
    fn gated_loader(
        calls: &Arc<AtomicUsize>,
    ) -> (
        oneshot::Sender<anyhow::Result<Arc<String>>>,
        impl FnOnce() -> BoxFuture<'static, anyhow::Result<Arc<String>>> + Send + 'static,
    ) {
        let (tx, rx) = oneshot::channel();
        let calls = Arc::clone(calls);
        let loader = move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { rx.await.unwrap_or_else(|_| Err(anyhow::anyhow!("gate dropped"))) }
                .boxed()
        };
        (tx, loader)
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_load() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate, loader) = gated_loader(&calls);

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get("school", loader).await }
        });
        let others: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get("school", counting_loader(&calls, "second load"))
                        .await
                })
            })
            .collect();

        // Let every task register before the load settles.
        while cache.status(&"school") != CacheStatus::Pending {
            tokio::task::yield_now().await;
        }
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        gate.send(Ok(Arc::new("school data".to_string()))).unwrap();

        let first = first.await.unwrap().unwrap();
        for other in join_all(others).await {
            let other = other.unwrap().unwrap();
            assert!(Arc::ptr_eq(&first, &other));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*first, "school data");
    }

    #[tokio::test]
    async fn test_concurrent_gets_on_one_task_share_one_load() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let results = join_all((0..8).map(|_| {
            let loader = {
                let calls = Arc::clone(&calls);
                move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        tokio::task::yield_now().await;
                        anyhow::Ok(Arc::new("school data".to_string()))
                    }
                }
            };
            cache.get("school", loader)
        }))
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
        }
    }

    #[tokio::test]
    async fn test_resolved_value_skips_loader() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get("school", counting_loader(&calls, "first")).await.unwrap();
        let second = cache.get("school", counting_loader(&calls, "second")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, "first");
    }

    #[tokio::test]
    async fn test_resolved_get_completes_on_first_poll() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        cache.get("school", counting_loader(&calls, "first")).await.unwrap();

        let value = cache
            .get("school", counting_loader(&calls, "second"))
            .now_or_never()
            .expect("resolved get should not suspend")
            .unwrap();
        assert_eq!(*value, "first");
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter_and_is_not_cached() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate, loader) = gated_loader(&calls);

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get("school", loader).await }
        });
        while cache.status(&"school") != CacheStatus::Pending {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move { cache.get("school", counting_loader(&calls, "unused")).await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        gate.send(Err(anyhow::anyhow!("network error"))).unwrap();

        let first = first.await.unwrap().unwrap_err();
        let second = second.await.unwrap().unwrap_err();
        assert_eq!(first.to_string(), "network error");
        assert_eq!(second.to_string(), "network error");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.status(&"school"), CacheStatus::Empty);

        // A later access retries.
        let third = cache.get("school", counting_loader(&calls, "recovered")).await.unwrap();
        assert_eq!(*third, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_after_failure_calls_loader_again() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let err = cache.get("school", failing_loader(&calls, "offline")).await.unwrap_err();
        assert!(matches!(err, CacheError::LoadFailed(_)));
        let err = cache.get("school", failing_loader(&calls, "offline")).await.unwrap_err();
        assert_eq!(err.to_string(), "offline");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("school", counting_loader(&calls, "v1")).await.unwrap();
        assert!(cache.invalidate(&"school"));
        assert_eq!(cache.peek(&"school"), None);

        let value = cache.get("school", counting_loader(&calls, "v2")).await.unwrap();
        assert_eq!(*value, "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.invalidate(&"missing"));
    }

    #[tokio::test]
    async fn test_invalidate_while_pending_stores_value_as_stale() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate, loader) = gated_loader(&calls);

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get("school", loader).await }
        });
        while cache.status(&"school") != CacheStatus::Pending {
            tokio::task::yield_now().await;
        }
        assert!(cache.invalidate(&"school"));

        // Still single-flight: a caller arriving now joins the old load.
        let joined = tokio::spawn({
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move { cache.get("school", counting_loader(&calls, "unused")).await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        gate.send(Ok(Arc::new("stale".to_string()))).unwrap();

        assert_eq!(*first.await.unwrap().unwrap(), "stale");
        assert_eq!(*joined.await.unwrap().unwrap(), "stale");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The load populated the cache, but only as a stale value.
        assert_eq!(cache.status(&"school"), CacheStatus::Stale);
        assert_eq!(cache.peek(&"school").as_deref().map(String::as_str), Some("stale"));
        assert!(cache.cached_at(&"school").is_some());

        let fresh = cache.get("school", counting_loader(&calls, "fresh")).await.unwrap();
        assert_eq!(*fresh, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.status(&"school"), CacheStatus::Resolved);
    }

    #[tokio::test]
    async fn test_invalidate_removes_stale_value() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate, loader) = gated_loader(&calls);

        let pending = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get("school", loader).await }
        });
        while cache.status(&"school") != CacheStatus::Pending {
            tokio::task::yield_now().await;
        }
        cache.invalidate(&"school");
        gate.send(Ok(Arc::new("stale".to_string()))).unwrap();
        pending.await.unwrap().unwrap();

        assert_eq!(cache.status(&"school"), CacheStatus::Stale);
        assert!(cache.invalidate(&"school"));
        assert_eq!(cache.status(&"school"), CacheStatus::Empty);
        assert_eq!(cache.peek(&"school"), None);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get("school", counting_loader(&calls, "school")).await.unwrap();
        let err = cache.get("news", failing_loader(&calls, "down")).await.unwrap_err();
        assert_eq!(err.to_string(), "down");

        assert_eq!(cache.status(&"school"), CacheStatus::Resolved);
        assert_eq!(cache.status(&"news"), CacheStatus::Empty);

        cache.invalidate(&"news");
        assert_eq!(cache.peek(&"school").as_deref().map(String::as_str), Some("school"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_peek_never_loads() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(cache.peek(&"school"), None);
        assert_eq!(cache.status(&"school"), CacheStatus::Empty);
        assert!(cache.cached_at(&"school").is_none());

        let (gate, loader) = gated_loader(&calls);
        let pending = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get("school", loader).await }
        });
        while cache.status(&"school") != CacheStatus::Pending {
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.peek(&"school"), None);

        gate.send(Ok(Arc::new("school data".to_string()))).unwrap();
        let loaded = pending.await.unwrap().unwrap();

        let peeked = cache.peek(&"school").unwrap();
        assert!(Arc::ptr_eq(&loaded, &peeked));
        assert!(cache.cached_at(&"school").is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_loader_is_reported_and_retried() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let err = cache
            .get("school", || async {
                if true {
                    panic!("loader bug");
                }
                anyhow::Ok(Arc::new(String::new()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::LoaderPanicked));
        assert_eq!(cache.status(&"school"), CacheStatus::Empty);

        let value = cache.get("school", counting_loader(&calls, "ok")).await.unwrap();
        assert_eq!(*value, "ok");
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_stall_other_waiters() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate, loader) = gated_loader(&calls);

        let first = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get("school", loader).await }
        });
        while cache.status(&"school") != CacheStatus::Pending {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move { cache.get("school", counting_loader(&calls, "unused")).await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        first.abort();
        let _ = first.await;
        gate.send(Ok(Arc::new("school data".to_string()))).unwrap();

        assert_eq!(*second.await.unwrap().unwrap(), "school data");
        assert_eq!(cache.status(&"school"), CacheStatus::Resolved);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_empties_resolved_keys() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        cache.get("school", counting_loader(&calls, "a")).await.unwrap();
        cache.get("news", counting_loader(&calls, "b")).await.unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.peek(&"news"), None);
        assert!(format!("{:?}", cache).contains("resolved: 0"));
    }
}
