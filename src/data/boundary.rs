//! Administrative boundary GeoJSON client
//!
//! Fetches region outlines from the DataV geo service. Each region code has a
//! detailed form that includes its sub-regions (`{code}_full.json`) and a
//! simple outline-only form (`{code}.json`). The detailed form is tried first
//! and the simple form is the fallback. Successful responses are kept for the
//! lifetime of the client.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::http_client;

/// Base URL for the DataV boundary service
pub const DATAV_BOUND_BASE_URL: &str = "https://geo.datav.aliyun.com/areas_v3/bound";

/// Errors from a single boundary request
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// HTTP request failed, returned a non-success status, or timed out
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Response body was not JSON
    #[error("Failed to parse GeoJSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for boundary GeoJSON with a permanent in-memory cache
#[derive(Debug)]
pub struct BoundaryClient {
    client: Client,
    base_url: String,
    cache: Mutex<HashMap<String, Value>>,
}

impl BoundaryClient {
    /// Creates a new BoundaryClient whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, BoundaryError> {
        Ok(Self::with_client(http_client(timeout)?))
    }

    /// Creates a new BoundaryClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DATAV_BOUND_BASE_URL.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Points the client at a different base URL, such as a local proxy prefix
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Gets boundary GeoJSON for a region code
    ///
    /// # Behavior
    /// - Returns the cached document if this code was fetched before
    /// - Otherwise tries the detailed document, then the simple one
    /// - Caches whichever succeeds under `code`
    /// - Returns `None` if both fail; nothing is cached in that case
    pub async fn get_boundary(&self, code: &str) -> Option<Value> {
        if let Some(cached) = self.cache.lock().get(code) {
            tracing::debug!(code, "Boundary cache hit");
            return Some(cached.clone());
        }

        let geojson = match self.fetch(&self.detailed_url(code)).await {
            Ok(geojson) => geojson,
            Err(detailed_err) => {
                tracing::warn!(code, error = %detailed_err, "Detailed boundary unavailable, trying outline");
                match self.fetch(&self.simple_url(code)).await {
                    Ok(geojson) => geojson,
                    Err(e) => {
                        tracing::error!(code, error = %e, "Boundary GeoJSON load failed");
                        return None;
                    }
                }
            }
        };

        self.cache.lock().insert(code.to_string(), geojson.clone());
        Some(geojson)
    }

    /// Number of region codes held in the cache
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    fn detailed_url(&self, code: &str) -> String {
        format!("{}/{}_full.json", self.base_url, code)
    }

    fn simple_url(&self, code: &str) -> String {
        format!("{}/{}.json", self.base_url, code)
    }

    async fn fetch(&self, url: &str) -> Result<Value, BoundaryError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
