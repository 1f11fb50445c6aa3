//! Time-bounded memoization of upstream responses.
//!
//! Keys are request signatures (URL plus header set), values remember when
//! they were stored. Refreshes are lazy: the next lookup after expiry fetches
//! again. Only successful responses are ever stored.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::error::Result;

/// Upper bound on stored entries; expired entries are swept before the
/// oldest survivor is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Time source seam so expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Request signature. Headers are kept sorted, so two requests differing only
/// in header order map to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    url: String,
    headers: BTreeMap<String, String>,
}

impl CacheKey {
    pub fn new(url: impl Into<String>, headers: &[(String, String)]) -> Self {
        Self {
            url: url.into(),
            headers: headers.iter().cloned().collect(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Status and body of a completed upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: String,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

struct CacheEntry {
    stored_at: SystemTime,
    ttl: Duration,
    response: FetchedResponse,
}

/// In-memory response cache guarding outbound calls to rate-limited upstreams.
///
/// The lock is held only around lookup and insert, never across the fetch
/// itself; concurrent refreshes of the same expired key resolve as
/// last-writer-wins.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), DEFAULT_MAX_ENTRIES)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            max_entries,
        }
    }

    /// Return the stored response for `key` if it is younger than `ttl`,
    /// otherwise invoke `fetch`. A successful response replaces the stored
    /// entry; a failed or non-success response is returned to the caller
    /// without touching the cache, and stale entries are not reused.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> Result<FetchedResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchedResponse>>,
    {
        if let Some(hit) = self.lookup(&key, ttl) {
            debug!(url = %key.url, "returning cached response");
            return Ok(hit);
        }

        info!(url = %key.url, "fetching fresh data");
        let response = fetch().await?;

        if response.is_success() {
            self.store(key, ttl, response.clone());
        }

        Ok(response)
    }

    fn lookup(&self, key: &CacheKey, ttl: Duration) -> Option<FetchedResponse> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        let age = self
            .clock
            .now()
            .duration_since(entry.stored_at)
            .unwrap_or_default();
        (age < ttl).then(|| entry.response.clone())
    }

    fn store(&self, key: CacheKey, ttl: Duration, response: FetchedResponse) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            entries.retain(|_, entry| {
                now.duration_since(entry.stored_at).unwrap_or_default() < entry.ttl
            });
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                ttl,
                response,
            },
        );
    }
}

#[cfg(test)]
pub(crate) struct ManualClock(Mutex<SystemTime>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn start_at(at: SystemTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(at)))
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.0.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::UNIX_EPOCH;

    fn ok(body: &str) -> FetchedResponse {
        FetchedResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    fn key(url: &str) -> CacheKey {
        CacheKey::new(url, &[])
    }

    #[test]
    fn header_order_does_not_change_the_key() {
        let a = CacheKey::new(
            "https://example.com",
            &[
                ("X-Token".to_string(), "t".to_string()),
                ("Accept".to_string(), "json".to_string()),
            ],
        );
        let b = CacheKey::new(
            "https://example.com",
            &[
                ("Accept".to_string(), "json".to_string()),
                ("X-Token".to_string(), "t".to_string()),
            ],
        );
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn second_call_within_ttl_does_not_refetch() {
        let clock = ManualClock::start_at(UNIX_EPOCH);
        let cache = ResponseCache::with_clock(clock.clone(), DEFAULT_MAX_ENTRIES);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..2 {
            let response = cache
                .get_or_fetch(key("https://example.com"), Duration::from_secs(300), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(ok("payload"))
                })
                .await
                .unwrap();
            assert_eq!(response.body, "payload");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn call_after_expiry_fetches_again() {
        let clock = ManualClock::start_at(UNIX_EPOCH);
        let cache = ResponseCache::with_clock(clock.clone(), DEFAULT_MAX_ENTRIES);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let fetch = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(ok("payload"))
        };

        cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), fetch)
            .await
            .unwrap();
        clock.advance(Duration::from_secs(301));
        cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), fetch)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_success_response_is_returned_but_not_cached() {
        let clock = ManualClock::start_at(UNIX_EPOCH);
        let cache = ResponseCache::with_clock(clock, DEFAULT_MAX_ENTRIES);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let fetch = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedResponse {
                status: 500,
                body: "boom".to_string(),
            })
        };

        let first = cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), fetch)
            .await
            .unwrap();
        assert_eq!(first.status, 500);

        cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), fetch)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_error_propagates_and_is_not_cached() {
        let clock = ManualClock::start_at(UNIX_EPOCH);
        let cache = ResponseCache::with_clock(clock, DEFAULT_MAX_ENTRIES);

        let result = cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), || async {
                Err(Error::MissingData("unreachable".to_string()))
            })
            .await;
        assert!(result.is_err());

        // A later successful fetch still runs.
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(ok("recovered"))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_entry_is_not_served_when_refresh_fails() {
        let clock = ManualClock::start_at(UNIX_EPOCH);
        let cache = ResponseCache::with_clock(clock.clone(), DEFAULT_MAX_ENTRIES);

        cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), || async {
                Ok(ok("original"))
            })
            .await
            .unwrap();
        clock.advance(Duration::from_secs(301));

        let result = cache
            .get_or_fetch(key("https://example.com"), Duration::from_secs(300), || async {
                Err(Error::MissingData("down".to_string()))
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn full_cache_evicts_expired_then_oldest() {
        let clock = ManualClock::start_at(UNIX_EPOCH);
        let cache = ResponseCache::with_clock(clock.clone(), 2);

        cache
            .get_or_fetch(key("https://a"), Duration::from_secs(10), || async { Ok(ok("a")) })
            .await
            .unwrap();
        clock.advance(Duration::from_secs(5));
        cache
            .get_or_fetch(key("https://b"), Duration::from_secs(300), || async { Ok(ok("b")) })
            .await
            .unwrap();
        clock.advance(Duration::from_secs(6));

        // `a` has expired by now; inserting `c` sweeps it rather than evicting `b`.
        cache
            .get_or_fetch(key("https://c"), Duration::from_secs(300), || async { Ok(ok("c")) })
            .await
            .unwrap();

        let calls = AtomicUsize::new(0);
        let calls = &calls;
        cache
            .get_or_fetch(key("https://b"), Duration::from_secs(300), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(ok("b2"))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0, "b should have survived the sweep");
    }
}
