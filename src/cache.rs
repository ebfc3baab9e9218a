use crate::models::MatchRecord;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Cache key used when a request carries no date
pub const TODAY_KEY: &str = "today";

/// Cache key for a query date
pub fn cache_key(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| TODAY_KEY.to_string())
}

/// Time source for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One computed aggregate. The records are shared read-only.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub fixtures: Arc<Vec<MatchRecord>>,
}

/// In-memory aggregate cache with a TTL.
///
/// Entries expire lazily on read and are replaced whole. Concurrent misses
/// on the same key wait on a per-key gate so only one recomputation runs.
pub struct ResultCache {
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: chrono::Duration::milliseconds(ttl.as_millis().min(i64::MAX as u128) as i64),
            clock,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now() - entry.created_at <= self.ttl
    }

    /// Fresh entry for `key`, if any
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        entries.get(key).filter(|e| self.is_fresh(e)).cloned()
    }

    /// Store records under `key`, replacing whatever was there
    pub async fn put(&self, key: &str, fixtures: Vec<MatchRecord>) -> CacheEntry {
        let entry = CacheEntry {
            key: key.to_string(),
            created_at: self.clock.now(),
            fixtures: Arc::new(fixtures),
        };
        self.entries
            .write()
            .await
            .insert(key.to_string(), entry.clone());
        entry
    }

    /// Return the fresh entry for `key`, or run `compute` and store its
    /// result. At most one `compute` runs per key at a time; callers that
    /// race on a cold key get the winner's entry.
    ///
    /// An empty result is returned but not stored, so the next request
    /// retries the upstreams instead of serving nothing for a whole TTL.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> CacheEntry
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<MatchRecord>>,
    {
        if let Some(hit) = self.get(key).await {
            return hit;
        }

        let gate = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(key.to_string()).or_default().clone()
        };

        let entry = {
            let _guard = gate.lock().await;
            match self.get(key).await {
                Some(hit) => {
                    debug!("Cache for {} filled by a concurrent request", key);
                    hit
                }
                None => {
                    debug!("Cache miss for {}, recomputing", key);
                    let fixtures = compute().await;
                    if fixtures.is_empty() {
                        debug!("Nothing computed for {}, not caching", key);
                        CacheEntry {
                            key: key.to_string(),
                            created_at: self.clock.now(),
                            fixtures: Arc::new(fixtures),
                        }
                    } else {
                        self.put(key, fixtures).await
                    }
                }
            }
        };

        // Drop the gate once nobody else is waiting on it
        let mut in_flight = self.in_flight.lock().await;
        if let Some(current) = in_flight.get(key) {
            if Arc::ptr_eq(current, &gate) && Arc::strong_count(&gate) <= 2 {
                in_flight.remove(key);
            }
        }

        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutcomeProbabilities, Trend, ValueScore, XgProvenance};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeClock {
        now: std::sync::Mutex<DateTime<Utc>>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: std::sync::Mutex::new(Utc.with_ymd_and_hms(2025, 3, 8, 12, 0, 0).unwrap()),
            }
        }

        fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn record(id: u64) -> MatchRecord {
        MatchRecord {
            id,
            date: Utc.with_ymd_and_hms(2025, 3, 8, 15, 0, 0).unwrap(),
            league: "Bundesliga".to_string(),
            home: "Bayern".to_string(),
            away: "Dortmund".to_string(),
            home_logo: String::new(),
            away_logo: String::new(),
            home_xg: 2.0,
            away_xg: 1.0,
            total_xg: 3.0,
            xg_source: XgProvenance::Primary,
            prob: OutcomeProbabilities {
                home: 0.6,
                draw: 0.2,
                away: 0.2,
                over25: 0.6,
                under25: 0.4,
                btts: 0.5,
            },
            value: ValueScore {
                home: 0.6,
                draw: 0.2,
                away: 0.2,
                over25: 0.6,
                under25: 0.4,
                has_odds: false,
            },
            has_odds: false,
            odds: None,
            btts: 0.5,
            trend: Trend::Neutral,
        }
    }

    fn cache(clock: Arc<FakeClock>) -> ResultCache {
        ResultCache::with_clock(Duration::from_secs(15 * 60), clock)
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(None), "today");
        assert_eq!(
            cache_key(NaiveDate::from_ymd_opt(2025, 3, 8)),
            "2025-03-08"
        );
    }

    #[tokio::test]
    async fn test_get_after_put() {
        let cache = cache(Arc::new(FakeClock::new()));
        assert!(cache.get("today").await.is_none());

        cache.put("today", vec![record(1), record(2)]).await;
        let entry = cache.get("today").await.unwrap();
        assert_eq!(entry.key, "today");
        assert_eq!(*entry.fixtures, vec![record(1), record(2)]);
        assert!(cache.get("2025-03-09").await.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let clock = Arc::new(FakeClock::new());
        let cache = cache(clock.clone());
        cache.put("today", vec![record(1)]).await;

        clock.advance(chrono::Duration::minutes(15));
        assert!(cache.get("today").await.is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert!(cache.get("today").await.is_none());
    }

    #[tokio::test]
    async fn test_stale_entry_is_replaced() {
        let clock = Arc::new(FakeClock::new());
        let cache = cache(clock.clone());
        cache.put("today", vec![record(1)]).await;
        clock.advance(chrono::Duration::minutes(30));

        let entry = cache
            .get_or_compute("today", || async { vec![record(7)] })
            .await;
        assert_eq!(entry.fixtures.len(), 1);
        assert_eq!(entry.fixtures[0].id, 7);
        assert_eq!(entry.created_at, clock.now());
    }

    #[tokio::test]
    async fn test_hit_skips_compute() {
        let cache = cache(Arc::new(FakeClock::new()));
        cache.put("today", vec![record(1)]).await;

        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let entry = cache
            .get_or_compute("today", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Vec::new()
            })
            .await;
        assert_eq!(entry.fixtures[0].id, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_compute_once() {
        let cache = cache(Arc::new(FakeClock::new()));
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let compute = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            vec![record(3)]
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_compute("2025-03-08", compute),
            cache.get_or_compute("2025-03-08", compute),
            cache.get_or_compute("2025-03-08", compute),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.created_at, b.created_at);
        assert_eq!(b.created_at, c.created_at);
        assert!(cache.in_flight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_is_not_cached() {
        let cache = cache(Arc::new(FakeClock::new()));
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let entry = cache
            .get_or_compute("today", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Vec::new()
            })
            .await;
        assert!(entry.fixtures.is_empty());
        assert!(cache.get("today").await.is_none());

        // Upstreams recovered: the next request recomputes and is cached
        let entry = cache
            .get_or_compute("today", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                vec![record(5)]
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(entry.fixtures[0].id, 5);
        assert!(cache.get("today").await.is_some());
        assert!(cache.in_flight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_different_keys_compute_independently() {
        let cache = cache(Arc::new(FakeClock::new()));
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let compute = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        };

        tokio::join!(
            cache.get_or_compute("2025-03-08", compute),
            cache.get_or_compute("2025-03-09", compute),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
