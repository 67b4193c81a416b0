use crate::helpers::{seed_database, spawn_app, spawn_seeded_app, MockClimateAccess};
use axum::http::StatusCode;
use climate::{db::Error, open_dataset};
use serde_json::json;
use std::sync::Arc;
use time::macros::date;

#[tokio::test]
async fn index_lists_routes() {
    let (_dir, test_app) = spawn_seeded_app().await;

    let (status, body) = test_app.get("/").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("/api/v1.0/precipitation"));
    assert!(html.contains("/api/v1.0/stations"));
    assert!(html.contains("/api/v1.0/tobs"));
    assert!(html.contains("2017-08-23"));
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, test_app) = spawn_seeded_app().await;

    let (status, body) = test_app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn health_reports_unavailable_storage() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_health_check()
        .times(1)
        .returning(|| Err(Error::StorageUnavailable(sqlx::Error::PoolClosed)));
    let test_app = spawn_app(Arc::new(climate_data)).await;

    let (status, body) = test_app.get_json("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn storage_failures_are_server_errors() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .returning(|| Err(Error::StorageUnavailable(sqlx::Error::PoolClosed)));
    climate_data
        .expect_most_active_station()
        .returning(|| Err(Error::StorageUnavailable(sqlx::Error::PoolClosed)));
    let test_app = spawn_app(Arc::new(climate_data)).await;

    for uri in [
        "/api/v1.0/precipitation",
        "/api/v1.0/tobs",
        "/api/v1.0/2017-06-01",
    ] {
        let (status, body) = test_app.get_json(uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn invalid_dates_never_reach_storage() {
    let mut climate_data = MockClimateAccess::new();
    climate_data.expect_latest_date().never();
    climate_data.expect_aggregate_temperatures().never();
    let test_app = spawn_app(Arc::new(climate_data)).await;

    let (status, _) = test_app.get_json("/api/v1.0/2017-06-01/not-a-date").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn most_active_station_without_rows_is_server_error() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_most_active_station()
        .returning(|| Ok(String::from("USC00519281")));
    climate_data
        .expect_latest_date_for_station()
        .returning(|_| Ok(None));
    let test_app = spawn_app(Arc::new(climate_data)).await;

    let (status, body) = test_app.get_json("/api/v1.0/tobs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "No measurements recorded for station USC00519281"})
    );
}

#[tokio::test]
async fn mocked_summary_uses_latest_date() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .returning(|| Ok(date!(2017 - 08 - 23)));
    climate_data
        .expect_aggregate_temperatures()
        .withf(|start, end| *start == date!(2017 - 08 - 01) && *end == date!(2017 - 08 - 23))
        .times(1)
        .returning(|_, _| {
            Ok(climate::TemperatureAggregate {
                tmin: Some(70.0),
                tavg: Some(78.5),
                tmax: Some(84.0),
            })
        });
    let test_app = spawn_app(Arc::new(climate_data)).await;

    let (status, body) = test_app.get_json("/api/v1.0/2017-08-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "begin": "2017-08-01",
            "end": "2017-08-23",
            "temps": {"tmin": 70.0, "tavg": 78.5, "tmax": 84.0}
        })
    );
}

#[tokio::test]
async fn docs_are_served() {
    let (_dir, test_app) = spawn_seeded_app().await;

    let (status, _) = test_app.get("/docs").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn open_dataset_rejects_empty_dataset() {
    let (_dir, path) = seed_database(&[]).await;
    let err = open_dataset(path.to_str().unwrap(), 1).await.unwrap_err();
    assert!(err.to_string().contains("no measurements"));
}

#[tokio::test]
async fn open_dataset_rejects_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.sqlite");
    assert!(open_dataset(path.to_str().unwrap(), 1).await.is_err());
}

#[tokio::test]
async fn open_dataset_accepts_seeded_file() {
    let (_dir, path) = seed_database(crate::helpers::MEASUREMENTS).await;
    let climate_db = open_dataset(path.to_str().unwrap(), 2).await.unwrap();
    climate_db.close().await;
}
