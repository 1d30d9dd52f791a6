//! geoweather - current weather and boundary GeoJSON from the command line
//!
//! Prints JSON to stdout so the output can be piped into other tools. Logs go
//! to stderr and are controlled with `RUST_LOG`.

use std::process::ExitCode;

use clap::Parser;
use serde_json::{json, Map, Value};

use geoweather::cli::{Cli, Command};
use geoweather::config::Config;
use geoweather::GeoWeather;

/// Installs the stderr log subscriber, defaulting to `info`
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one command and returns the JSON to print
async fn run(cli: Cli) -> Result<Value, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let config = cli.apply_overrides(config);
    let app = GeoWeather::new(&config)?;

    let output = match cli.command {
        Command::Weather { lat, lng } => {
            let record = app.get_weather_by_location(lat, lng).await?;
            serde_json::to_value(record)?
        }
        Command::Batch { locations } => {
            let results = app.get_batch_weather(&locations).await;
            let items = locations
                .iter()
                .zip(results)
                .map(|(location, lookup)| {
                    json!({
                        "id": location.external_id,
                        "lat": location.latitude,
                        "lng": location.longitude,
                        "status": lookup.status(),
                        "weather": lookup.record(),
                    })
                })
                .collect();
            Value::Array(items)
        }
        Command::Boundary { codes } => {
            let boundaries = app.get_area_geojson_many(&codes).await;
            let map: Map<String, Value> = codes
                .into_iter()
                .zip(boundaries)
                .map(|(code, geojson)| (code, geojson.unwrap_or(Value::Null)))
                .collect();
            Value::Object(map)
        }
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
