//! WMO weather code labels
//!
//! Open-Meteo reports conditions as WMO weather interpretation codes. This
//! module turns those codes into the labels shown on the dashboard.

/// Label returned for any code missing from the table
pub const UNKNOWN_WEATHER_LABEL: &str = "Unknown";

/// Map a WMO weather code to a human-readable label
///
/// Codes covered:
/// - 0-3: Clear to overcast
/// - 45, 48: Fog
/// - 51-55: Drizzle
/// - 61-65: Rain
/// - 71-75: Snow
/// - 80: Rain showers
/// - 95: Thunderstorm
///
/// Every other code maps to [`UNKNOWN_WEATHER_LABEL`].
pub fn decode_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Rain showers",
        95 => "Thunderstorm",
        _ => UNKNOWN_WEATHER_LABEL,
    }
}
