//! geoweather library
//!
//! Batched, cached current-weather lookups from Open-Meteo and administrative
//! boundary GeoJSON from DataV, for map dashboards. [`GeoWeather`] exposes the
//! three entry points the dashboard uses; the modules below are public so
//! hosts can assemble the pieces themselves.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod service;
pub mod sweep;

pub use api::{GeoWeather, SetupError};
pub use cache::{Clock, EvictionPolicy, ManualClock, SystemClock, WeatherCache};
pub use config::{Config, ConfigError};
pub use data::{Coordinate, WeatherLookup, WeatherRecord};
pub use service::WeatherService;
pub use sweep::{SweepConfig, SweepHandle};
