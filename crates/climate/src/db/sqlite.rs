use async_trait::async_trait;
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{path::Path, time::Duration};
use time::Date;

use super::{ClimateData, Error, PrecipitationReading, StationName, TemperatureAggregate};
use crate::dates::{format_date, parse_date};

/// Columns the queries below depend on, checked once when the database is opened.
pub const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("measurement", &["station", "date", "prcp", "tobs"]),
    ("station", &["station", "name"]),
];

/// SQLite-backed dataset, opened read-only.
///
/// The pool is shared by all request handlers; the dataset never changes while
/// the service runs so no coordination beyond the pool is needed.
#[derive(Clone, Debug)]
pub struct ClimateDatabase {
    pool: SqlitePool,
}

impl ClimateDatabase {
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.verify_schema().await?;
        info!("SQLite dataset opened read-only at: {}", path.display());

        Ok(db)
    }

    /// Fail fast when the file does not carry the tables and columns we query.
    pub async fn verify_schema(&self) -> Result<(), Error> {
        for (table, columns) in REQUIRED_SCHEMA {
            let present: Vec<String> =
                sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
                    .bind(*table)
                    .fetch_all(&self.pool)
                    .await?;

            if let Some(missing) = columns
                .iter()
                .find(|column| !present.iter().any(|p| p.eq_ignore_ascii_case(column)))
            {
                return Err(Error::SchemaMismatch {
                    table: table.to_string(),
                    column: missing.to_string(),
                });
            }
            debug!("table {} has columns {:?}", table, present);
        }
        Ok(())
    }

    /// Release every pooled connection; called once during shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite dataset connections closed");
    }
}

fn stored_date(text: String) -> Result<Date, Error> {
    parse_date(&text).map_err(|_| Error::MalformedDate(text))
}

#[async_trait]
impl ClimateData for ClimateDatabase {
    async fn latest_date(&self) -> Result<Date, Error> {
        let (latest,): (Option<String>,) = sqlx::query_as("SELECT MAX(date) FROM measurement")
            .fetch_one(&self.pool)
            .await?;

        latest.map(stored_date).unwrap_or(Err(Error::EmptyDataset))
    }

    async fn measurements_on_or_after(
        &self,
        since: Date,
    ) -> Result<Vec<PrecipitationReading>, Error> {
        let rows: Vec<(String, Option<f64>)> = sqlx::query_as(
            "SELECT date, CAST(prcp AS REAL)
             FROM measurement
             WHERE date >= ?
             ORDER BY date ASC, station ASC",
        )
        .bind(format_date(since))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(date, precipitation)| {
                Ok(PrecipitationReading {
                    date: stored_date(date)?,
                    precipitation,
                })
            })
            .collect()
    }

    async fn stations_with_names(&self) -> Result<Vec<StationName>, Error> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT s.station, COALESCE(MIN(s.name), '')
             FROM station s
             WHERE EXISTS (SELECT 1 FROM measurement m WHERE m.station = s.station)
             GROUP BY s.station
             ORDER BY s.station ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(station, name)| StationName { station, name })
            .collect())
    }

    async fn most_active_station(&self) -> Result<String, Error> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT station, COUNT(tobs) AS observations
             FROM measurement
             GROUP BY station
             ORDER BY observations DESC, station ASC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let (station, observations) = row.ok_or(Error::EmptyDataset)?;
        debug!(
            "most active station {} with {} observations",
            station, observations
        );
        Ok(station)
    }

    async fn latest_date_for_station(&self, station: &str) -> Result<Option<Date>, Error> {
        let (latest,): (Option<String>,) =
            sqlx::query_as("SELECT MAX(date) FROM measurement WHERE station = ?")
                .bind(station)
                .fetch_one(&self.pool)
                .await?;

        latest.map(stored_date).transpose()
    }

    async fn temperature_observations(
        &self,
        station: &str,
        since: Date,
    ) -> Result<Vec<f64>, Error> {
        let observations: Vec<f64> = sqlx::query_scalar(
            "SELECT CAST(tobs AS REAL)
             FROM measurement
             WHERE station = ? AND date >= ? AND tobs IS NOT NULL",
        )
        .bind(station)
        .bind(format_date(since))
        .fetch_all(&self.pool)
        .await?;

        Ok(observations)
    }

    async fn aggregate_temperatures(
        &self,
        start: Date,
        end: Date,
    ) -> Result<TemperatureAggregate, Error> {
        let (tmin, tavg, tmax): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT CAST(MIN(tobs) AS REAL), CAST(AVG(tobs) AS REAL), CAST(MAX(tobs) AS REAL)
             FROM measurement
             WHERE date >= ? AND date <= ?",
        )
        .bind(format_date(start))
        .bind(format_date(end))
        .fetch_one(&self.pool)
        .await?;

        Ok(TemperatureAggregate { tmin, tavg, tmax })
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
