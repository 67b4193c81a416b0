use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use climate::{
    app, build_app_state, db::Error, ClimateData, ClimateDatabase, PrecipitationReading,
    StationName, TemperatureAggregate,
};
use hyper::{header, Method};
use mockall::mock;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use time::Date;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
}

pub async fn spawn_app(climate_db: Arc<dyn ClimateData>) -> TestApp {
    let app_state = build_app_state(String::from("http://127.0.0.1:5000"), climate_db);
    TestApp { app: app(app_state) }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let json = serde_json::from_slice(&body)
            .unwrap_or_else(|e| panic!("{} did not return json: {}", uri, e));
        (status, json)
    }
}

mock! {
    pub ClimateAccess {}

    #[async_trait]
    impl ClimateData for ClimateAccess {
        async fn latest_date(&self) -> Result<Date, Error>;
        async fn measurements_on_or_after(&self, since: Date)
            -> Result<Vec<PrecipitationReading>, Error>;
        async fn stations_with_names(&self) -> Result<Vec<StationName>, Error>;
        async fn most_active_station(&self) -> Result<String, Error>;
        async fn latest_date_for_station(&self, station: &str) -> Result<Option<Date>, Error>;
        async fn temperature_observations(&self, station: &str, since: Date)
            -> Result<Vec<f64>, Error>;
        async fn aggregate_temperatures(&self, start: Date, end: Date)
            -> Result<TemperatureAggregate, Error>;
        async fn health_check(&self) -> Result<(), Error>;
    }
}

pub const STATIONS: &[(&str, &str)] = &[
    ("USC00513117", "KANEOHE 838.1, HI US"),
    ("USC00517948", "PEARL CITY, HI US"),
    ("USC00519281", "WAIHEE 837.5, HI US"),
    ("USC00519397", "WAIKIKI 717.2, HI US"),
];

pub type MeasurementRow = (&'static str, &'static str, Option<f64>, Option<f64>);

/// Small slice of the Hawaii dataset: last recorded date 2017-08-23, and
/// USC00519281 has the most temperature observations but stops on 2017-08-18.
pub const MEASUREMENTS: &[MeasurementRow] = &[
    ("USC00519397", "2016-08-22", Some(0.45), Some(78.0)),
    ("USC00519397", "2016-08-23", Some(0.0), Some(81.0)),
    ("USC00519397", "2017-06-01", Some(0.0), Some(79.0)),
    ("USC00519397", "2017-06-05", Some(0.0), Some(80.0)),
    ("USC00519397", "2017-08-20", Some(0.0), Some(80.0)),
    ("USC00519397", "2017-08-21", Some(0.0), Some(81.0)),
    ("USC00519397", "2017-08-22", Some(0.0), Some(82.0)),
    ("USC00519397", "2017-08-23", Some(0.0), Some(81.0)),
    ("USC00513117", "2016-08-23", None, Some(76.0)),
    ("USC00513117", "2017-06-02", Some(0.02), Some(74.0)),
    ("USC00513117", "2017-08-23", Some(0.08), Some(82.0)),
    ("USC00519281", "2015-01-01", Some(0.1), Some(70.0)),
    ("USC00519281", "2016-08-17", Some(0.01), Some(77.0)),
    ("USC00519281", "2016-08-18", Some(0.0), Some(80.0)),
    ("USC00519281", "2016-09-01", Some(0.2), Some(78.0)),
    ("USC00519281", "2016-12-01", Some(0.3), Some(72.0)),
    ("USC00519281", "2017-01-10", Some(0.0), Some(68.0)),
    ("USC00519281", "2017-03-15", Some(1.2), Some(71.0)),
    ("USC00519281", "2017-06-03", None, Some(73.0)),
    ("USC00519281", "2017-08-18", Some(0.06), Some(79.0)),
];

/// Write a SQLite file with the `station` and `measurement` tables
pub async fn seed_database(rows: &[MeasurementRow]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hawaii.sqlite");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true),
        )
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE station (id INTEGER PRIMARY KEY, station TEXT, name TEXT,
         latitude FLOAT, longitude FLOAT, elevation FLOAT)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TABLE measurement (id INTEGER PRIMARY KEY, station TEXT, date TEXT,
         prcp FLOAT, tobs FLOAT)",
    )
    .execute(&pool)
    .await
    .unwrap();

    for (station, name) in STATIONS {
        sqlx::query("INSERT INTO station (station, name) VALUES (?, ?)")
            .bind(*station)
            .bind(*name)
            .execute(&pool)
            .await
            .unwrap();
    }
    for (station, date, prcp, tobs) in rows {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
            .bind(*station)
            .bind(*date)
            .bind(*prcp)
            .bind(*tobs)
            .execute(&pool)
            .await
            .unwrap();
    }
    pool.close().await;

    (dir, path)
}

/// App backed by a seeded SQLite file; keep the returned dir alive for the test
pub async fn spawn_seeded_app() -> (TempDir, TestApp) {
    let (dir, path) = seed_database(MEASUREMENTS).await;
    let climate_db = ClimateDatabase::open(&path, 4).await.unwrap();
    (dir, spawn_app(Arc::new(climate_db)).await)
}
