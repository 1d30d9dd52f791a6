//! In-memory cache for normalized weather records
//!
//! This module provides a [`WeatherCache`] keyed by coordinate with a fixed
//! time-to-live. Stale entries are ignored on read rather than removed, so a
//! host that cares about memory either bounds the cache with an
//! [`EvictionPolicy`] or sweeps it periodically. Time is supplied by a
//! [`Clock`] so callers and tests control what "now" means.

mod clock;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{cache_key, EvictionPolicy, WeatherCache, DEFAULT_TTL};
