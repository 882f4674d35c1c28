use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::models::{PageKey, PageResponse};
use super::source::PageSource;
use crate::error::PageError;

/// Result of a cache fetch as seen by the controller.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// A fresh or cached response that is authoritative for its key
    Loaded(Arc<PageResponse>),
    /// The request completed with a classified failure
    Failed(PageError),
    /// The completion lost to a newer request for the same key and must
    /// not touch visible state
    Superseded,
}

struct CacheEntry {
    response: Option<Arc<PageResponse>>,
    error: Option<PageError>,
    token: u64,
}

struct InFlight {
    token: u64,
    tx: broadcast::Sender<FetchOutcome>,
}

struct CacheInner {
    entries: HashMap<PageKey, CacheEntry>,
    /// Latest token issued per key; a completion is only allowed to write
    /// if its captured token still matches
    latest: HashMap<PageKey, u64>,
    in_flight: HashMap<PageKey, InFlight>,
}

impl Default for CacheInner {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            latest: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }
}

/// What `fetch` decided to do while holding the lock. Splitting the
/// decision from the await keeps the mutex guard out of the future.
enum FetchPlan {
    Hit(Arc<PageResponse>),
    Join(broadcast::Receiver<FetchOutcome>),
    Issue {
        token: u64,
        tx: broadcast::Sender<FetchOutcome>,
    },
}

/// Deduplicating, invalidatable page fetch cache.
///
/// At most one outstanding request per key: concurrent callers attach to
/// the in-flight fetch instead of hitting the source again. A forced
/// refresh issues a new request token for its key, which retires the
/// in-flight one; stale completions are discarded without ever reaching
/// the cache or subscribers.
pub struct PageCache {
    source: Arc<dyn PageSource>,
    inner: Mutex<CacheInner>,
    token_counter: AtomicU64,
}

impl PageCache {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            inner: Mutex::new(CacheInner::default()),
            token_counter: AtomicU64::new(0),
        }
    }

    /// Fetch a page, going to the source only when needed.
    ///
    /// With `force_refresh` a new request is always issued and any
    /// in-flight request for the key is superseded.
    pub async fn fetch(&self, key: PageKey, force_refresh: bool) -> FetchOutcome {
        let plan = self.plan(key, force_refresh);

        let (token, tx) = match plan {
            FetchPlan::Hit(response) => {
                tracing::debug!("Cache hit for {}", key);
                return FetchOutcome::Loaded(response);
            }
            FetchPlan::Join(mut rx) => {
                tracing::debug!("Coalescing fetch for {}", key);
                return match rx.recv().await {
                    Ok(outcome) => outcome,
                    // Sender dropped without a result; treat as retired
                    Err(_) => FetchOutcome::Superseded,
                };
            }
            FetchPlan::Issue { token, tx } => (token, tx),
        };

        tracing::debug!("Fetching {} (token {})", key, token);
        let result = self.source.fetch(key.page, key.sub_page).await;

        let outcome = {
            let mut inner = self.inner.lock().unwrap();

            // Only clear the in-flight slot if it is still ours; a forced
            // refresh may have replaced it with a newer request.
            if inner
                .in_flight
                .get(&key)
                .is_some_and(|pending| pending.token == token)
            {
                inner.in_flight.remove(&key);
            }

            if inner.latest.get(&key) != Some(&token) {
                tracing::debug!("Discarding stale completion for {} (token {})", key, token);
                FetchOutcome::Superseded
            } else {
                match result {
                    Ok(response) => {
                        let response = Arc::new(response);
                        inner.entries.insert(
                            key,
                            CacheEntry {
                                response: Some(response.clone()),
                                error: None,
                                token,
                            },
                        );
                        FetchOutcome::Loaded(response)
                    }
                    Err(error) => {
                        tracing::debug!("Fetch failed for {}: {}", key, error);
                        inner.entries.insert(
                            key,
                            CacheEntry {
                                response: None,
                                error: Some(error.clone()),
                                token,
                            },
                        );
                        FetchOutcome::Failed(error)
                    }
                }
            }
        };

        // Waiters may have gone away; nothing to do then
        let _ = tx.send(outcome.clone());

        outcome
    }

    fn plan(&self, key: PageKey, force_refresh: bool) -> FetchPlan {
        let mut inner = self.inner.lock().unwrap();

        if !force_refresh {
            if let Some(entry) = inner.entries.get(&key) {
                // Error entries are not served as hits: a revisit after a
                // 404 or outage should try the source again
                if let Some(ref response) = entry.response {
                    if inner.latest.get(&key) == Some(&entry.token) {
                        return FetchPlan::Hit(response.clone());
                    }
                }
            }

            if let Some(pending) = inner.in_flight.get(&key) {
                // Join only a request that can still win; a retired one
                // would hand us Superseded for no reason
                if inner.latest.get(&key) == Some(&pending.token) {
                    return FetchPlan::Join(pending.tx.subscribe());
                }
            }
        }

        let token = self.token_counter.fetch_add(1, Ordering::Relaxed) + 1;
        inner.latest.insert(key, token);

        let (tx, _rx) = broadcast::channel(1);
        inner.in_flight.insert(
            key,
            InFlight {
                token,
                tx: tx.clone(),
            },
        );

        FetchPlan::Issue { token, tx }
    }

    /// Last failure recorded for a key, if the latest completed request
    /// for it failed
    pub fn last_error(&self, key: PageKey) -> Option<PageError> {
        let inner = self.inner.lock().unwrap();
        inner.entries.get(&key).and_then(|entry| entry.error.clone())
    }

    /// Discard the entry for one key, if present
    pub fn invalidate(&self, key: PageKey) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.remove(&key);
    }

    /// Discard every entry and retire all in-flight tokens, so responses
    /// still in transit can no longer reach the cache
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        let entries = inner.entries.len();
        let pending = inner.in_flight.len();
        inner.entries.clear();
        inner.latest.clear();
        tracing::info!(
            "Cache invalidated ({} entries dropped, {} in-flight retired)",
            entries,
            pending
        );
    }
}
