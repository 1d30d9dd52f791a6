//! Cache manager for normalized weather records
//!
//! Provides a `WeatherCache` that keeps the last record fetched for each
//! coordinate together with its fetch time. Freshness is decided on read
//! against the configured TTL.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

use crate::data::WeatherRecord;

/// Default time-to-live for cached weather (10 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// How the cache bounds its size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// No size bound; stale entries stay until overwritten or swept
    #[default]
    Unbounded,
    /// At most this many entries; inserting a new key into a full cache
    /// evicts the least recently used entry
    MaxEntries(usize),
}

/// Wrapper struct for a cached record
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached record
    record: WeatherRecord,
    /// When the record was fetched, in epoch milliseconds
    fetched_at_ms: i64,
    /// Access stamp for least-recently-used eviction
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    tick: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Builds the cache key for a coordinate
///
/// Latitude and longitude are formatted as-is with no rounding, so two points
/// share an entry only when both values are identical.
pub fn cache_key(latitude: f64, longitude: f64) -> String {
    format!("{},{}", latitude, longitude)
}

/// Time-boxed store of weather records keyed by coordinate
///
/// The cache is meant to be created by the host application and shared with
/// the services that use it. Each call takes the lock briefly and never holds
/// it across an `.await`, so overlapping batches that miss on the same point
/// both fetch and the later write wins.
#[derive(Debug)]
pub struct WeatherCache {
    ttl_ms: i64,
    policy: EvictionPolicy,
    state: Mutex<CacheState>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl WeatherCache {
    /// Creates an unbounded cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            policy: EvictionPolicy::default(),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Sets the eviction policy
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.max(0) as u64)
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Reads a record from the cache
    ///
    /// Returns `None` if there is no entry for the coordinate or the entry is
    /// stale (`now_ms - fetched_at >= ttl`). Stale entries are left in place.
    pub fn get(&self, latitude: f64, longitude: f64, now_ms: i64) -> Option<WeatherRecord> {
        let mut state = self.state.lock();
        let tick = state.next_tick();
        let entry = state.entries.get_mut(&cache_key(latitude, longitude))?;

        if now_ms.saturating_sub(entry.fetched_at_ms) >= self.ttl_ms {
            return None;
        }

        entry.last_used = tick;
        Some(entry.record.clone())
    }

    /// Writes a record to the cache, replacing any existing entry for the coordinate
    pub fn put(&self, latitude: f64, longitude: f64, record: WeatherRecord, now_ms: i64) {
        let key = cache_key(latitude, longitude);
        let mut state = self.state.lock();

        if let EvictionPolicy::MaxEntries(capacity) = self.policy {
            if capacity == 0 {
                return;
            }
            if !state.entries.contains_key(&key) && state.entries.len() >= capacity {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    tracing::debug!(key = %oldest, "Evicting least recently used weather entry");
                    state.entries.remove(&oldest);
                }
            }
        }

        let tick = state.next_tick();
        state.entries.insert(
            key,
            CacheEntry {
                record,
                fetched_at_ms: now_ms,
                last_used: tick,
            },
        );
    }

    /// Removes every stale entry and returns how many were removed
    pub fn sweep(&self, now_ms: i64) -> usize {
        let ttl_ms = self.ttl_ms;
        let mut state = self.state.lock();
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| now_ms.saturating_sub(entry.fetched_at_ms) < ttl_ms);
        before - state.entries.len()
    }

    /// Number of entries held, fresh or stale
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }
}
