//! Read-through USD price cache with in-flight request de-duplication.
//!
//! ```text
//! usd_price(id)
//!      │
//!      ▼
//! ┌──────────────────┐  hit   ┌─────────────┐
//! │ LRU price cache  │──────▶ │ cached value│
//! └────────┬─────────┘        └─────────────┘
//!          │ miss / expired
//!          ▼
//! ┌──────────────────┐ pending ┌──────────────────────┐
//! │ in-flight table  │───────▶ │ await shared request │
//! └────────┬─────────┘         └──────────────────────┘
//!          │ none
//!          ▼
//!   start request, register it, await it
//! ```
//!
//! Failures are logged and reported as `None`; nothing is retried and
//! nothing is cached on failure.

use crate::clock::Clock;
use crate::pricing::coingecko::PriceSource;
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default lifetime of a cached price used for fee quoting.
pub const QUOTE_PRICE_TTL: Duration = Duration::from_secs(60);

/// Default lifetime of a cached price used for display labels.
pub const DISPLAY_PRICE_TTL: Duration = Duration::from_secs(10 * 60);

/// Default number of price-feed ids kept in the cache.
pub const DEFAULT_PRICE_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    value: f64,
    expires_at: Instant,
}

type PendingPrice = Shared<BoxFuture<'static, Option<f64>>>;

struct OracleState {
    source: Arc<dyn PriceSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cache: Mutex<LruCache<String, CachedPrice>>,
    in_flight: Mutex<HashMap<String, PendingPrice>>,
}

impl OracleState {
    fn cached(&self, id: &str) -> Option<f64> {
        let now = self.clock.now();
        let mut cache = self.cache.lock();
        match cache.get(id) {
            Some(entry) if entry.expires_at > now => Some(entry.value),
            Some(_) => {
                cache.pop(id);
                None
            }
            None => None,
        }
    }
}

/// Process-wide USD price cache.
///
/// Cheap to clone; clones share the cache and the in-flight table.
#[derive(Clone)]
pub struct PriceOracle {
    state: Arc<OracleState>,
}

impl PriceOracle {
    /// Create an oracle over `source` whose entries live for `ttl`.
    #[must_use]
    pub fn new(
        source: Arc<dyn PriceSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Arc::new(OracleState {
                source,
                clock,
                ttl,
                cache: Mutex::new(LruCache::new(capacity)),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Cache lifetime of this oracle.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.state.ttl
    }

    /// Return the cached price for `id` without touching the network.
    #[must_use]
    pub fn cached_usd_price(&self, id: &str) -> Option<f64> {
        self.state.cached(id)
    }

    /// Return the USD price for `id`, fetching it if the cache has no live
    /// entry.
    ///
    /// Concurrent callers asking for the same uncached id share one request.
    pub async fn usd_price(&self, id: &str) -> Option<f64> {
        if let Some(price) = self.state.cached(id) {
            debug!("Price cache hit for {id}");
            return Some(price);
        }

        let pending = {
            let mut in_flight = self.state.in_flight.lock();
            // The request publishes to the cache before leaving the table, so
            // re-checking here under the lock cannot miss a finished request.
            if let Some(price) = self.state.cached(id) {
                return Some(price);
            }
            if let Some(pending) = in_flight.get(id) {
                debug!("Joining in-flight price request for {id}");
                pending.clone()
            } else {
                let pending = Self::request(Arc::clone(&self.state), id.to_string());
                in_flight.insert(id.to_string(), pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Like [`Self::usd_price`], but substitute `fallback` when the feed has no
    /// usable price. Non-finite fallbacks are ignored.
    pub async fn usd_rate_or(&self, id: &str, fallback: Option<f64>) -> Option<f64> {
        match self.usd_price(id).await {
            Some(price) => Some(price),
            None => fallback.filter(|rate| rate.is_finite()),
        }
    }

    fn request(state: Arc<OracleState>, id: String) -> PendingPrice {
        async move {
            let result = match state.source.fetch_usd_price(&id).await {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    let expires_at = state.clock.now() + state.ttl;
                    state.cache.lock().put(
                        id.clone(),
                        CachedPrice {
                            value: price,
                            expires_at,
                        },
                    );
                    debug!("Cached USD price {price} for {id}");
                    Some(price)
                }
                Ok(price) => {
                    warn!("Price feed returned invalid price {price} for {id}");
                    None
                }
                Err(e) => {
                    warn!("Failed to fetch price for {id}: {e}");
                    None
                }
            };
            state.in_flight.lock().remove(&id);
            result
        }
        .boxed()
        .shared()
    }
}
