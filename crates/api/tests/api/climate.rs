use crate::helpers::{spawn_app, MockClimateAccess};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use climate_api::{
    Error, PrecipitationReading, Station, TemperatureReading, TemperatureStats,
    MOST_ACTIVE_STATION,
};
use hyper::Method;
use serde_json::Value;
use std::sync::Arc;
use time::macros::date;
use tower::ServiceExt;

async fn get_json(test_app: &crate::helpers::TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

#[tokio::test]
async fn precipitation_covers_the_final_year_of_readings() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_most_recent_date()
        .times(1)
        .returning(|| Ok(date!(2017 - 08 - 23)));

    climate_db
        .expect_precipitation()
        .withf(|start, end| *start == date!(2016 - 08 - 23) && *end == date!(2017 - 08 - 23))
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                PrecipitationReading {
                    date: String::from("2016-08-24"),
                    prcp: Some(0.08),
                },
                PrecipitationReading {
                    date: String::from("2016-08-24"),
                    prcp: None,
                },
            ])
        });

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, body) = get_json(&test_app, "/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    // One object per source row, duplicate dates retained
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date"], "2016-08-24");
    assert_eq!(rows[0]["prcp"], 0.08);
    assert!(rows[1]["prcp"].is_null());
}

#[tokio::test]
async fn precipitation_surfaces_an_empty_dataset_as_a_server_error() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_most_recent_date()
        .times(1)
        .returning(|| Err(Error::EmptyDataset));

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, _) = get_json(&test_app, "/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn stations_lists_every_station_row_with_exact_keys() {
    let mut climate_db = MockClimateAccess::new();

    climate_db.expect_stations().times(1).returning(|| {
        Ok(vec![
            Station {
                id: 1,
                station: String::from("USC00519397"),
                name: String::from("WAIKIKI 717.2, HI US"),
                latitude: 21.2716,
                longitude: -157.8168,
                elevation: 3.0,
            },
            Station {
                id: 2,
                station: String::from("USC00513117"),
                name: String::from("KANEOHE 838.1, HI US"),
                latitude: 21.4234,
                longitude: -157.8015,
                elevation: 14.6,
            },
        ])
    });

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, body) = get_json(&test_app, "/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let mut keys: Vec<&str> = rows[0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["elevation", "id", "latitude", "longitude", "name", "station"]
    );
}

#[tokio::test]
async fn stations_returns_an_empty_array_when_storage_has_no_rows() {
    let mut climate_db = MockClimateAccess::new();

    climate_db.expect_stations().times(1).returning(|| Ok(vec![]));

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, body) = get_json(&test_app, "/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn tobs_is_pinned_to_the_most_active_station() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_most_recent_date()
        .times(1)
        .returning(|| Ok(date!(2017 - 08 - 23)));

    climate_db
        .expect_temperature_observations()
        .withf(|station_id, start| {
            station_id.as_str() == MOST_ACTIVE_STATION && *start == date!(2016 - 08 - 23)
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![TemperatureReading {
                date: String::from("2016-08-23"),
                tobs: 77.0,
            }])
        });

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, body) = get_json(&test_app, "/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["date"], "2016-08-23");
    assert_eq!(rows[0]["tobs"], 77.0);
}

#[tokio::test]
async fn temperature_stats_with_a_start_date_only() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_temperature_stats()
        .withf(|start, end| start.as_str() == "2017-01-01" && end.is_none())
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min: Some(58.0),
                avg: Some(74.14),
                max: Some(87.0),
            })
        });

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, body) = get_json(&test_app, "/api/v1.0/2017-01-01").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["min"], 58.0);
    assert_eq!(rows[0]["avg"], 74.14);
    assert_eq!(rows[0]["max"], 87.0);
}

#[tokio::test]
async fn temperature_stats_with_a_start_and_end_date() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_temperature_stats()
        .withf(|start, end| {
            start.as_str() == "2017-01-01" && end.as_deref() == Some("2017-01-31")
        })
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min: Some(60.0),
                avg: Some(68.9),
                max: Some(78.0),
            })
        });

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, body) = get_json(&test_app, "/api/v1.0/2017-01-01/2017-01-31").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["min"], 60.0);
}

#[tokio::test]
async fn temperature_stats_render_nulls_when_nothing_matches() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_temperature_stats()
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min: None,
                avg: None,
                max: None,
            })
        });

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, body) = get_json(&test_app, "/api/v1.0/2019-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([{"min": null, "avg": null, "max": null}])
    );
}

#[tokio::test]
async fn malformed_start_dates_are_passed_through_to_storage() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_temperature_stats()
        .withf(|start, end| start.as_str() == "not-a-date" && end.is_none())
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min: None,
                avg: None,
                max: None,
            })
        });

    let test_app = spawn_app(Arc::new(climate_db));
    let (status, _) = get_json(&test_app, "/api/v1.0/not-a-date").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_get_methods_receive_method_not_allowed() {
    let climate_db = MockClimateAccess::new();
    let test_app = spawn_app(Arc::new(climate_db));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1.0/stations")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
