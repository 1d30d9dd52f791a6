//! Integration tests for the weather client and batch orchestrator using wiremock.
//!
//! These tests verify request shape, cache use, and partial-failure behavior
//! against a mock Open-Meteo server.

use std::sync::Arc;
use std::time::Duration;

use geoweather::data::{WeatherClient, WeatherError};
use geoweather::{
    Config, Coordinate, GeoWeather, ManualClock, WeatherCache, WeatherLookup, WeatherRecord,
    WeatherService,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORECAST_PATH: &str = "/v1/forecast";
const START_MS: i64 = 1_700_000_000_000;

/// Helper to create one location in an Open-Meteo response
fn location(temperature: f64, weathercode: i32) -> Value {
    json!({
        "latitude": 0.0,
        "longitude": 0.0,
        "current_weather": {
            "time": "2024-07-15T14:00",
            "interval": 900,
            "temperature": temperature,
            "windspeed": 12.0,
            "winddirection": 200,
            "weathercode": weathercode
        }
    })
}

fn expected(temperature: f64, weathercode: i32) -> WeatherRecord {
    WeatherRecord::new(temperature, 12.0, 200.0, weathercode, "2024-07-15T14:00")
}

fn weather_client(server: &MockServer) -> WeatherClient {
    WeatherClient::new(Duration::from_secs(10))
        .expect("Failed to build client")
        .with_base_url(format!("{}{}", server.uri(), FORECAST_PATH))
}

fn service(server: &MockServer, clock: Arc<ManualClock>) -> WeatherService {
    WeatherService::with_clock(weather_client(server), Arc::new(WeatherCache::default()), clock)
}

fn point(latitude: f64, longitude: f64, id: &str) -> Coordinate {
    Coordinate::new(latitude, longitude, id)
}

#[tokio::test]
async fn test_fetch_one_sends_fixed_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("latitude", "39.9"))
        .and(query_param("longitude", "116.4"))
        .and(query_param("current_weather", "true"))
        .and(query_param("windspeed_unit", "kmh"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(location(31.5, 3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let record = weather_client(&mock_server)
        .fetch_one(39.9, 116.4)
        .await
        .expect("Lookup should succeed");

    assert_eq!(record, Some(expected(31.5, 3)));
    assert_eq!(record.unwrap().weather_label(), "Overcast");
}

#[tokio::test]
async fn test_fetch_one_without_current_weather_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 39.875,
            "longitude": 116.375
        })))
        .mount(&mock_server)
        .await;

    let record = weather_client(&mock_server)
        .fetch_one(39.9, 116.4)
        .await
        .expect("A reachable endpoint without data is not an error");

    assert!(record.is_none());
}

#[tokio::test]
async fn test_fetch_one_propagates_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = weather_client(&mock_server).fetch_one(39.9, 116.4).await;

    match result {
        Err(WeatherError::RequestFailed(e)) => {
            assert_eq!(e.status().map(|s| s.as_u16()), Some(500));
        }
        other => panic!("Expected RequestFailed error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_one_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(location(20.0, 0))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(Duration::from_millis(100))
        .expect("Failed to build client")
        .with_base_url(format!("{}{}", mock_server.uri(), FORECAST_PATH));
    let result = client.fetch_one(39.9, 116.4).await;

    match result {
        Err(WeatherError::RequestFailed(e)) => assert!(e.is_timeout(), "Expected timeout: {}", e),
        other => panic!("Expected timeout error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_many_accepts_single_object_for_one_coordinate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("latitude", "31.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(location(27.0, 61)))
        .mount(&mock_server)
        .await;

    let records = weather_client(&mock_server)
        .fetch_many(&[point(31.2, 121.5, "310000")])
        .await
        .expect("Lookup should succeed");

    assert_eq!(records, vec![Some(expected(27.0, 61))]);
}

#[tokio::test]
async fn test_fetch_many_rejects_short_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([location(1.0, 0), location(2.0, 0)])),
        )
        .mount(&mock_server)
        .await;

    let result = weather_client(&mock_server)
        .fetch_many(&[point(1.0, 1.0, "a"), point(2.0, 2.0, "b"), point(3.0, 3.0, "c")])
        .await;

    match result {
        Err(WeatherError::LengthMismatch { expected, actual }) => {
            assert_eq!(expected, 3);
            assert_eq!(actual, 2);
        }
        other => panic!("Expected LengthMismatch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_batch_empty_input_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service(&mock_server, Arc::new(ManualClock::new(START_MS)));
    let results = service.get_batch(&[]).await;

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_batch_all_cached_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service(&mock_server, clock.clone());
    let coordinates = [point(1.0, 10.0, "a"), point(2.0, 20.0, "b"), point(3.0, 30.0, "c")];
    for (i, c) in coordinates.iter().enumerate() {
        service
            .cache()
            .put(c.latitude, c.longitude, expected(i as f64, 0), START_MS);
    }

    clock.advance(599_999);
    let results = service.get_batch(&coordinates).await;

    assert_eq!(
        results,
        vec![
            WeatherLookup::Found(expected(0.0, 0)),
            WeatherLookup::Found(expected(1.0, 0)),
            WeatherLookup::Found(expected(2.0, 0)),
        ]
    );
}

#[tokio::test]
async fn test_batch_all_miss_fetches_once_and_fills_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("latitude", "1,2,3"))
        .and(query_param("longitude", "10,20,30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            location(11.0, 0),
            location(12.0, 2),
            location(13.0, 95),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service(&mock_server, clock.clone());
    let coordinates = [point(1.0, 10.0, "a"), point(2.0, 20.0, "b"), point(3.0, 30.0, "c")];

    let results = service.get_batch(&coordinates).await;

    assert_eq!(
        results,
        vec![
            WeatherLookup::Found(expected(11.0, 0)),
            WeatherLookup::Found(expected(12.0, 2)),
            WeatherLookup::Found(expected(13.0, 95)),
        ]
    );
    assert_eq!(service.cache().len(), 3);
    assert_eq!(service.cache().get(2.0, 20.0, START_MS + 1), Some(expected(12.0, 2)));

    // A second batch within the TTL is served entirely from cache
    clock.advance(60_000);
    let again = service.get_batch(&coordinates).await;
    assert_eq!(again, results);
}

#[tokio::test]
async fn test_batch_mixed_hits_and_misses_keeps_input_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("latitude", "2,4"))
        .and(query_param("longitude", "20,40"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([location(22.0, 1), location(24.0, 3)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service(&mock_server, clock.clone());
    let a = point(1.0, 10.0, "a");
    let b = point(2.0, 20.0, "b");
    let c = point(3.0, 30.0, "c");
    let d = point(4.0, 40.0, "d");
    service.cache().put(a.latitude, a.longitude, expected(21.0, 0), START_MS);
    service.cache().put(c.latitude, c.longitude, expected(23.0, 0), START_MS);

    clock.advance(1);
    let results = service.get_batch(&[a, b, c, d]).await;

    assert_eq!(
        results,
        vec![
            WeatherLookup::Found(expected(21.0, 0)),
            WeatherLookup::Found(expected(22.0, 1)),
            WeatherLookup::Found(expected(23.0, 0)),
            WeatherLookup::Found(expected(24.0, 3)),
        ]
    );
    assert_eq!(service.cache().len(), 4);
}

#[tokio::test]
async fn test_batch_remote_failure_returns_failed_slots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service(&mock_server, Arc::new(ManualClock::new(START_MS)));
    let coordinates = [point(1.0, 10.0, "a"), point(2.0, 20.0, "b"), point(3.0, 30.0, "c")];

    let results = service.get_batch(&coordinates).await;

    assert_eq!(results, vec![WeatherLookup::Failed; 3]);
    assert!(service.cache().is_empty(), "Failed fetches must not touch the cache");
}

#[tokio::test]
async fn test_batch_length_mismatch_is_treated_as_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([location(1.0, 0)])))
        .mount(&mock_server)
        .await;

    let service = service(&mock_server, Arc::new(ManualClock::new(START_MS)));
    let results = service
        .get_batch(&[point(1.0, 10.0, "a"), point(2.0, 20.0, "b")])
        .await;

    assert_eq!(results, vec![WeatherLookup::Failed, WeatherLookup::Failed]);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_batch_entry_without_data_is_no_data_and_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            location(5.0, 71),
            { "latitude": 2.0, "longitude": 20.0 },
        ])))
        .mount(&mock_server)
        .await;

    let service = service(&mock_server, Arc::new(ManualClock::new(START_MS)));
    let results = service
        .get_batch(&[point(1.0, 10.0, "a"), point(2.0, 20.0, "b")])
        .await;

    assert_eq!(
        results,
        vec![WeatherLookup::Found(expected(5.0, 71)), WeatherLookup::NoData]
    );
    assert_eq!(service.cache().len(), 1);
    assert!(service.cache().get(2.0, 20.0, START_MS).is_none());
}

#[tokio::test]
async fn test_batch_refetches_stale_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("latitude", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(location(30.0, 0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let clock = Arc::new(ManualClock::new(START_MS));
    let service = service(&mock_server, clock.clone());
    service.cache().put(1.0, 10.0, expected(-5.0, 0), START_MS);

    clock.advance(600_001);
    let results = service.get_batch(&[point(1.0, 10.0, "a")]).await;

    assert_eq!(results, vec![WeatherLookup::Found(expected(30.0, 0))]);
    assert_eq!(service.cache().get(1.0, 10.0, START_MS + 600_002), Some(expected(30.0, 0)));
}

#[tokio::test]
async fn test_facade_uses_configured_endpoint_and_shared_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("latitude", "39.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(location(18.0, 45)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = Config {
        weather_url: format!("{}{}", mock_server.uri(), FORECAST_PATH),
        ..Default::default()
    };
    let cache = Arc::new(WeatherCache::new(config.cache_ttl()));
    let app = GeoWeather::with_cache(&config, cache.clone(), Arc::new(ManualClock::new(START_MS)))
        .expect("Failed to build app");

    // Single lookups bypass the cache
    let single = app
        .get_weather_by_location(39.9, 116.4)
        .await
        .expect("Lookup should succeed");
    assert_eq!(single, Some(expected(18.0, 45)));
    assert!(cache.is_empty());

    let batch = app.get_batch_weather(&[point(39.9, 116.4, "110000")]).await;
    assert_eq!(batch, vec![WeatherLookup::Found(expected(18.0, 45))]);
    assert_eq!(cache.len(), 1);
    assert!(Arc::ptr_eq(app.cache(), &cache));
}

#[tokio::test]
async fn test_facade_sweeper_drops_stale_entries() {
    let config = Config {
        sweep_interval_secs: Some(1),
        ..Default::default()
    };
    let clock = Arc::new(ManualClock::new(START_MS));
    let cache = Arc::new(WeatherCache::new(config.cache_ttl()));
    let app = GeoWeather::with_cache(&config, cache.clone(), clock.clone())
        .expect("Failed to build app");

    cache.put(1.0, 10.0, expected(1.0, 0), START_MS);
    cache.put(2.0, 20.0, expected(2.0, 0), START_MS + 300_000);
    clock.advance(600_000);

    let sweeper = app.spawn_sweeper(&config);
    assert!(sweeper.is_running());
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert_eq!(cache.len(), 1);
    assert!(cache.get(2.0, 20.0, START_MS + 600_000).is_some());
    sweeper.shutdown().await;
}
