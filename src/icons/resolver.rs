//! # IconResolver: memo cache with bounded wait and single-flight.
//!
//! Resolves a domain to an icon reference, eventually and exactly once per
//! domain. Three rules govern the pipeline:
//!
//! - **Cache**: once a domain settled (concrete reference or fallback), the
//!   cached outcome is returned immediately and permanently. A fetch that
//!   loses the race against the bounded wait never rewrites a cached
//!   fallback back to success — first-to-settle wins, bounding latency at
//!   the cost of occasionally caching "fallback" for a slow icon. That is an
//!   accepted trade-off, not a bug.
//! - **Bounded wait**: the fetch races a fixed timeout; timeout and fetch
//!   errors both settle to [`IconOutcome::Fallback`].
//! - **Single-flight**: concurrent `resolve` calls for the same uncached
//!   domain share one in-flight future; the fetcher is driven at most once
//!   per key.
//!
//! ## Architecture
//! ```text
//! resolve(domain)
//!     │  cache lookup (Mutex<HashMap>)
//!     ├─ Settled(outcome) ────────────────────────► return outcome
//!     ├─ InFlight(shared) ───► await shared ──────► return outcome
//!     └─ miss:
//!          build shared future = timeout(icon_timeout, fetcher.fetch())
//!          insert InFlight(shared), await it,
//!          upgrade entry to Settled(outcome) ─────► return outcome
//! ```

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::Shared;
use tokio::sync::Mutex;
use tokio::time;

use crate::icons::fetch::FetchRef;

/// Opaque icon reference (URL, data URI, resource key — the render
/// surface's business).
pub type IconRef = Arc<str>;

/// Settled result of icon resolution for one domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IconOutcome {
    /// A concrete icon reference was fetched in time.
    Resolved(IconRef),
    /// The fetch failed or timed out; display the generic marker.
    Fallback,
}

type ResolveFuture = Shared<Pin<Box<dyn Future<Output = IconOutcome> + Send>>>;

/// Cache entry: either still racing, or settled forever.
enum CacheEntry {
    InFlight(ResolveFuture),
    Settled(IconOutcome),
}

/// Domain → icon resolution pipeline with memoization.
///
/// ### Responsibilities
/// - Drives the injected fetcher at most once per domain
/// - Bounds the externally observed latency via `icon_timeout`
/// - Memoizes the first settled outcome permanently
///
/// ### Rules
/// - `resolve` always eventually settles; it never returns an error
/// - The cache is only ever written by whichever source settles first
pub struct IconResolver {
    cache: Mutex<HashMap<String, CacheEntry>>,
    fetcher: FetchRef,
    timeout: Duration,
}

impl IconResolver {
    /// Creates a resolver around the given fetch mechanism.
    pub fn new(fetcher: FetchRef, timeout: Duration) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            fetcher,
            timeout,
        }
    }

    /// Resolves a domain to its icon outcome.
    ///
    /// Cache hit returns immediately; a miss starts one fetch raced against
    /// the bounded wait and shares it with any concurrent caller.
    pub async fn resolve(&self, domain: &str) -> IconOutcome {
        let fut = {
            let mut cache = self.cache.lock().await;
            match cache.get(domain) {
                Some(CacheEntry::Settled(outcome)) => return outcome.clone(),
                Some(CacheEntry::InFlight(fut)) => fut.clone(),
                None => {
                    let fut = self.start_flight(domain);
                    cache.insert(domain.to_string(), CacheEntry::InFlight(fut.clone()));
                    fut
                }
            }
        };

        let outcome = fut.await;

        // First awaiter back upgrades the entry; later ones find Settled.
        let mut cache = self.cache.lock().await;
        if let Some(entry @ CacheEntry::InFlight(_)) = cache.get_mut(domain) {
            *entry = CacheEntry::Settled(outcome.clone());
        }
        outcome
    }

    /// Returns the settled outcome for a domain, if any.
    ///
    /// In-flight resolutions report `None`; this never triggers a fetch.
    pub async fn peek(&self, domain: &str) -> Option<IconOutcome> {
        let cache = self.cache.lock().await;
        match cache.get(domain) {
            Some(CacheEntry::Settled(outcome)) => Some(outcome.clone()),
            _ => None,
        }
    }

    /// Builds the shared in-flight future for one domain.
    fn start_flight(&self, domain: &str) -> ResolveFuture {
        let fetcher = Arc::clone(&self.fetcher);
        let timeout = self.timeout;
        let domain = domain.to_string();

        let fut: Pin<Box<dyn Future<Output = IconOutcome> + Send>> = Box::pin(async move {
            match time::timeout(timeout, fetcher.fetch(&domain)).await {
                Ok(Ok(icon)) => IconOutcome::Resolved(icon),
                Ok(Err(_)) | Err(_) => IconOutcome::Fallback,
            }
        });
        fut.shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::IconError;
    use crate::icons::fetch::FetchFn;

    fn counting_fetcher(calls: Arc<AtomicUsize>, ok: bool) -> FetchRef {
        FetchFn::arc(move |domain: String| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if ok {
                    Ok(format!("icon://{domain}").into())
                } else {
                    Err(IconError::Fetch {
                        error: "boom".to_string(),
                    })
                }
            }
        })
    }

    #[tokio::test]
    async fn success_is_cached_and_fetched_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver =
            IconResolver::new(counting_fetcher(calls.clone(), true), Duration::from_secs(1));

        let first = resolver.resolve("a.com").await;
        let second = resolver.resolve("a.com").await;
        assert_eq!(first, IconOutcome::Resolved("icon://a.com".into()));
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_settles_to_fallback_without_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver =
            IconResolver::new(counting_fetcher(calls.clone(), false), Duration::from_secs(1));

        assert_eq!(resolver.resolve("d.com").await, IconOutcome::Fallback);
        assert_eq!(resolver.resolve("d.com").await, IconOutcome::Fallback);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.peek("d.com").await, Some(IconOutcome::Fallback));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_loses_to_timeout_permanently() {
        let calls = Arc::new(AtomicUsize::new(0));
        let slow: FetchRef = {
            let calls = Arc::clone(&calls);
            FetchFn::arc(move |domain: String| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    time::sleep(Duration::from_secs(60)).await;
                    Ok(format!("icon://{domain}").into())
                }
            })
        };
        let resolver = IconResolver::new(slow, Duration::from_millis(100));

        assert_eq!(resolver.resolve("slow.com").await, IconOutcome::Fallback);
        // First-to-settle wins for good: the cached fallback stands even
        // though the real icon exists.
        assert_eq!(resolver.resolve("slow.com").await, IconOutcome::Fallback);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_flight() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = Arc::new(IconResolver::new(
            counting_fetcher(calls.clone(), true),
            Duration::from_secs(1),
        ));

        let a = {
            let r = Arc::clone(&resolver);
            tokio::spawn(async move { r.resolve("x.com").await })
        };
        let b = {
            let r = Arc::clone(&resolver);
            tokio::spawn(async move { r.resolve("x.com").await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
