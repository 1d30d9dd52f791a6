//! Entry points used by the dashboard
//!
//! `GeoWeather` wires the weather service, the shared cache, and the boundary
//! client together from a [`Config`]. Its three lookups are the only calls
//! the map layer needs.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use thiserror::Error;

use crate::cache::{Clock, SystemClock, WeatherCache};
use crate::config::Config;
use crate::data::{
    http_client, BoundaryClient, Coordinate, WeatherClient, WeatherError, WeatherLookup,
    WeatherRecord,
};
use crate::service::WeatherService;
use crate::sweep::SweepHandle;

/// Errors that can occur while building the clients
#[derive(Debug, Error)]
pub enum SetupError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Weather and boundary lookups for the dashboard
#[derive(Debug)]
pub struct GeoWeather {
    weather: WeatherService,
    boundaries: BoundaryClient,
    clock: Arc<dyn Clock>,
}

impl GeoWeather {
    /// Builds the clients and a fresh weather cache from `config`
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        let cache = Arc::new(
            WeatherCache::new(config.cache_ttl()).with_policy(config.eviction_policy()),
        );
        Self::with_cache(config, cache, Arc::new(SystemClock))
    }

    /// Builds the clients around a cache owned by the host
    pub fn with_cache(
        config: &Config,
        cache: Arc<WeatherCache>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SetupError> {
        let client = http_client(config.request_timeout())?;

        let weather_client =
            WeatherClient::with_client(client.clone()).with_base_url(config.weather_url.as_str());
        let boundaries =
            BoundaryClient::with_client(client).with_base_url(config.boundary_url.as_str());

        Ok(Self {
            weather: WeatherService::with_clock(weather_client, cache, clock.clone()),
            boundaries,
            clock,
        })
    }

    /// The weather cache shared with the batch lookups
    pub fn cache(&self) -> &Arc<WeatherCache> {
        self.weather.cache()
    }

    /// Spawns a background sweeper for the weather cache using `config`'s interval
    pub fn spawn_sweeper(&self, config: &Config) -> SweepHandle {
        SweepHandle::spawn(self.cache().clone(), self.clock.clone(), config.sweep_config())
    }

    /// Current weather for one point, uncached; transport errors are returned
    pub async fn get_weather_by_location(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<WeatherRecord>, WeatherError> {
        self.weather.get_one(lat, lng).await
    }

    /// Current weather for many points, cached and batched; never fails
    pub async fn get_batch_weather(&self, locations: &[Coordinate]) -> Vec<WeatherLookup> {
        self.weather.get_batch(locations).await
    }

    /// Boundary GeoJSON for a region code, or `None` if it could not be loaded
    pub async fn get_area_geojson(&self, code: &str) -> Option<Value> {
        self.boundaries.get_boundary(code).await
    }

    /// Boundary GeoJSON for several region codes, fetched concurrently
    ///
    /// Results are returned in the same order as `codes`.
    pub async fn get_area_geojson_many(&self, codes: &[String]) -> Vec<Option<Value>> {
        join_all(codes.iter().map(|code| self.boundaries.get_boundary(code))).await
    }
}
