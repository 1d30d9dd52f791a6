//! Batched weather lookups backed by the shared cache
//!
//! `WeatherService` answers batches of coordinates from the cache where it
//! can and sends everything else to Open-Meteo in a single request. A failed
//! request never fails the batch: cached points are still returned and the
//! rest are marked [`WeatherLookup::Failed`].

use std::sync::Arc;

use crate::cache::{Clock, SystemClock, WeatherCache};
use crate::data::{Coordinate, WeatherClient, WeatherError, WeatherLookup, WeatherRecord};

/// Orchestrates cached, batched weather lookups
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: WeatherClient,
    cache: Arc<WeatherCache>,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    /// Creates a service using wall-clock time
    pub fn new(client: WeatherClient, cache: Arc<WeatherCache>) -> Self {
        Self::with_clock(client, cache, Arc::new(SystemClock))
    }

    /// Creates a service with a custom time source
    pub fn with_clock(
        client: WeatherClient,
        cache: Arc<WeatherCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            cache,
            clock,
        }
    }

    /// The cache this service reads and fills
    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }

    /// Looks up a single coordinate, bypassing the cache
    ///
    /// Transport errors are returned to the caller.
    pub async fn get_one(&self, lat: f64, lng: f64) -> Result<Option<WeatherRecord>, WeatherError> {
        self.client.fetch_one(lat, lng).await
    }

    /// Looks up a batch of coordinates
    ///
    /// # Returns
    /// One [`WeatherLookup`] per input coordinate, in input order. This never
    /// fails: if the remote request fails, cache hits are still `Found` and
    /// every other slot is `Failed`.
    ///
    /// # Behavior
    /// - Empty input returns immediately without a request
    /// - Fresh cache entries are used as-is
    /// - All misses go out in one request, in input order
    /// - Fetched records are cached with the time the batch started
    pub async fn get_batch(&self, coordinates: &[Coordinate]) -> Vec<WeatherLookup> {
        if coordinates.is_empty() {
            return Vec::new();
        }

        let now = self.clock.now_ms();
        let mut results = vec![WeatherLookup::Failed; coordinates.len()];
        let mut pending_indices = Vec::new();
        let mut pending = Vec::new();

        for (index, coordinate) in coordinates.iter().enumerate() {
            match self.cache.get(coordinate.latitude, coordinate.longitude, now) {
                Some(record) => results[index] = WeatherLookup::Found(record),
                None => {
                    pending_indices.push(index);
                    pending.push(coordinate.clone());
                }
            }
        }

        tracing::debug!(
            total = coordinates.len(),
            misses = pending.len(),
            "Weather batch cache check"
        );

        if pending.is_empty() {
            return results;
        }

        let fetched = match self.client.fetch_many(&pending).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(
                    misses = pending.len(),
                    error = %e,
                    "Batch weather fetch failed, returning partial results"
                );
                return results;
            }
        };

        for ((index, coordinate), record) in pending_indices.into_iter().zip(&pending).zip(fetched) {
            results[index] = match record {
                Some(record) => {
                    self.cache
                        .put(coordinate.latitude, coordinate.longitude, record.clone(), now);
                    WeatherLookup::Found(record)
                }
                None => WeatherLookup::NoData,
            };
        }

        results
    }
}
