//! Core data models for the weather dashboard
//!
//! This module contains the coordinate and weather record types shared by
//! the remote clients, the cache, and the batch orchestrator.

pub mod boundary;
pub mod codes;
pub mod weather;

pub use boundary::{BoundaryClient, BoundaryError};
pub use codes::{decode_weather_code, UNKNOWN_WEATHER_LABEL};
pub use weather::{WeatherClient, WeatherError};

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// A query point supplied by the map layer
///
/// `external_id` is an opaque tag (for example a region code) that is carried
/// through unchanged. Lookups and caching only look at latitude and longitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Caller-supplied tag
    #[serde(default)]
    pub external_id: String,
}

impl Coordinate {
    /// Creates a coordinate with the given tag
    pub fn new(latitude: f64, longitude: f64, external_id: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            external_id: external_id.into(),
        }
    }
}

/// Normalized current-conditions observation for one point
///
/// The label is always derived from the weather code. There is no way to set
/// one without the other, which is also why this type is serialize-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    /// Air temperature in Celsius
    pub temperature_celsius: f64,
    /// Wind speed in km/h
    pub wind_speed_kmh: f64,
    /// Wind direction in degrees
    pub wind_direction_degrees: f64,
    /// WMO weather code
    pub weather_code: i32,
    weather_label: String,
    /// Observation time as reported by the provider
    pub observed_at: String,
}

impl WeatherRecord {
    pub fn new(
        temperature_celsius: f64,
        wind_speed_kmh: f64,
        wind_direction_degrees: f64,
        weather_code: i32,
        observed_at: impl Into<String>,
    ) -> Self {
        Self {
            temperature_celsius,
            wind_speed_kmh,
            wind_direction_degrees,
            weather_code,
            weather_label: decode_weather_code(weather_code).to_string(),
            observed_at: observed_at.into(),
        }
    }

    /// Human-readable label for `weather_code`
    pub fn weather_label(&self) -> &str {
        &self.weather_label
    }
}

/// Outcome of looking up one coordinate in a batch
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherLookup {
    /// A record was served from cache or fetched
    Found(WeatherRecord),
    /// The provider answered but had no current conditions for this point
    NoData,
    /// The remote call for this point failed
    Failed,
}

impl WeatherLookup {
    /// Returns the record, if any
    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            WeatherLookup::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Collapses the outcome into an `Option`, dropping the failure reason
    pub fn into_record(self) -> Option<WeatherRecord> {
        match self {
            WeatherLookup::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Short status name used in CLI output
    pub fn status(&self) -> &'static str {
        match self {
            WeatherLookup::Found(_) => "found",
            WeatherLookup::NoData => "no_data",
            WeatherLookup::Failed => "failed",
        }
    }
}

/// Builds the HTTP client shared by the weather and boundary clients
///
/// Every request made through it is bounded by `timeout`; an expired request
/// surfaces as a transport error.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}
