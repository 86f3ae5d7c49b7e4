use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type SharedFetch<V> = Shared<BoxFuture<'static, V>>;

/// Query cache that deduplicates in-flight fetches.
///
/// The first caller for a key starts the fetch; callers arriving while it is
/// still running await the same future. Resolved values stay cached for the
/// lifetime of the cache, except failures stored through
/// [`Cache::get_or_try_fetch`].
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, SharedFetch<V>>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the value for `key`, running `fetch` only if no fetch for the
    /// key has been started yet.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let shared = {
            let mut entries = self.inner.lock().await;
            match entries.get(&key) {
                Some(existing) => {
                    debug!(?key, "Cache HIT");
                    existing.clone()
                }
                None => {
                    debug!(?key, "Cache MISS");
                    let started = fetch().boxed().shared();
                    entries.insert(key, started.clone());
                    started
                }
            }
        };
        shared.await
    }

    /// Returns the value for `key` if its fetch has already completed.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.inner.lock().await;
        entries.get(key).and_then(|fetch| fetch.peek().cloned())
    }
}

impl<K, T, E> Cache<K, Result<T, E>>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Like [`Cache::get_or_fetch`], but a failed fetch is evicted once it
    /// resolves. Callers that joined it still share the error; the next
    /// caller starts a new fetch.
    pub async fn get_or_try_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let entries = Arc::clone(&self.inner);
        let evict_key = key.clone();
        self.get_or_fetch(key, move || {
            let fetching = fetch();
            async move {
                let result = fetching.await;
                if result.is_err() {
                    // the entry is still this fetch: no other can start while it is mapped
                    debug!(key = ?evict_key, "Evicting failed fetch");
                    entries.lock().await.remove(&evict_key);
                }
                result
            }
        })
        .await
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
