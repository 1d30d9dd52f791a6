//! Open-Meteo current-weather client
//!
//! This module fetches current conditions from the Open-Meteo forecast API for
//! one or many coordinates and normalizes the provider's response into
//! [`WeatherRecord`]s.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{http_client, Coordinate, WeatherRecord};

/// Base URL for the Open-Meteo API
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed, returned a non-success status, or timed out
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The provider returned a different number of results than requested
    #[error("Expected {expected} results from provider, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Client for fetching current weather from the Open-Meteo API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Create a new WeatherClient whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, WeatherError> {
        Ok(Self::with_client(http_client(timeout)?))
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different forecast endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch current weather for a single coordinate
    ///
    /// # Returns
    /// * `Ok(Some(record))` - The provider reported current conditions
    /// * `Ok(None)` - The provider answered without current conditions
    /// * `Err(WeatherError)` - The request or parsing failed (already logged)
    pub async fn fetch_one(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<WeatherRecord>, WeatherError> {
        match self.request(&lat.to_string(), &lng.to_string()).await {
            Ok(payload) => Ok(payload.into_records().into_iter().next().flatten()),
            Err(e) => {
                tracing::error!(latitude = lat, longitude = lng, error = %e, "Open-Meteo lookup failed");
                Err(e)
            }
        }
    }

    /// Fetch current weather for many coordinates in a single request
    ///
    /// Latitudes and longitudes are sent as parallel comma-joined lists in input
    /// order. The result has one entry per coordinate, in the same order. A
    /// response with a different number of entries is rejected with
    /// [`WeatherError::LengthMismatch`] rather than aligned by guesswork.
    pub async fn fetch_many(
        &self,
        coordinates: &[Coordinate],
    ) -> Result<Vec<Option<WeatherRecord>>, WeatherError> {
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        let latitudes = join_values(coordinates.iter().map(|c| c.latitude));
        let longitudes = join_values(coordinates.iter().map(|c| c.longitude));

        let records = self.request(&latitudes, &longitudes).await?.into_records();
        if records.len() != coordinates.len() {
            return Err(WeatherError::LengthMismatch {
                expected: coordinates.len(),
                actual: records.len(),
            });
        }

        Ok(records)
    }

    async fn request(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<OpenMeteoPayload, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude),
                ("longitude", longitude),
                ("current_weather", "true"),
                ("windspeed_unit", "kmh"),
                ("timezone", "auto"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn join_values(values: impl Iterator<Item = f64>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

/// Open-Meteo answers with an array for multi-coordinate requests and a bare
/// object for a single coordinate
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OpenMeteoPayload {
    Many(Vec<LocationResponse>),
    One(LocationResponse),
}

impl OpenMeteoPayload {
    fn into_records(self) -> Vec<Option<WeatherRecord>> {
        match self {
            OpenMeteoPayload::Many(locations) => {
                locations.into_iter().map(LocationResponse::into_record).collect()
            }
            OpenMeteoPayload::One(location) => vec![location.into_record()],
        }
    }
}

/// One location in an Open-Meteo response
#[derive(Debug, Deserialize)]
struct LocationResponse {
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
}

impl LocationResponse {
    fn into_record(self) -> Option<WeatherRecord> {
        self.current_weather.map(|cw| {
            WeatherRecord::new(
                cw.temperature,
                cw.windspeed,
                cw.winddirection,
                cw.weathercode,
                cw.time,
            )
        })
    }
}

/// `current_weather` block from Open-Meteo
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: i32,
    time: String,
}
