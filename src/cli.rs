//! Command-line interface parsing for geoweather
//!
//! This module handles parsing of CLI arguments using clap, including the
//! `LAT,LNG[,ID]` coordinate syntax used by the `batch` command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::data::Coordinate;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The coordinate argument is not `LAT,LNG` or `LAT,LNG,ID`
    #[error("Invalid coordinate: '{0}'. Expected LAT,LNG or LAT,LNG,ID")]
    InvalidCoordinate(String),
}

/// geoweather - current weather and boundary GeoJSON for map dashboards
#[derive(Parser, Debug)]
#[command(name = "geoweather")]
#[command(about = "Current weather and boundary GeoJSON for map dashboards")]
#[command(version)]
pub struct Cli {
    /// Read configuration from this JSON file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the Open-Meteo forecast endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub weather_url: Option<String>,

    /// Override the boundary GeoJSON base URL (e.g. a local proxy prefix)
    #[arg(long, global = true, value_name = "URL")]
    pub boundary_url: Option<String>,

    /// Override the per-request timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Current weather for a single point (uncached)
    Weather {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Current weather for many points in one request
    ///
    /// Examples:
    ///   geoweather batch 39.9042,116.4074,110000 31.2304,121.4737,310000
    ///   geoweather batch -33.8688,151.2093
    Batch {
        /// Points as LAT,LNG or LAT,LNG,ID
        #[arg(required = true, allow_hyphen_values = true, value_parser = parse_coordinate_arg)]
        locations: Vec<Coordinate>,
    },
    /// Boundary GeoJSON for one or more region codes
    Boundary {
        /// Administrative region codes (e.g. 110000)
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

/// Parses a `LAT,LNG[,ID]` argument into a Coordinate.
///
/// # Returns
/// * `Ok(Coordinate)` if both numbers parse; the ID defaults to empty
/// * `Err(CliError::InvalidCoordinate)` otherwise
pub fn parse_coordinate_arg(s: &str) -> Result<Coordinate, CliError> {
    let invalid = || CliError::InvalidCoordinate(s.to_string());

    let mut parts = s.splitn(3, ',');
    let latitude = parts
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(invalid)?;
    let longitude = parts
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(invalid)?;
    let external_id = parts.next().unwrap_or("").trim();

    Ok(Coordinate::new(latitude, longitude, external_id))
}

impl Cli {
    /// Applies command-line overrides on top of a loaded config
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(url) = &self.weather_url {
            config.weather_url = url.clone();
        }
        if let Some(url) = &self.boundary_url {
            config.boundary_url = url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
        config
    }
}
