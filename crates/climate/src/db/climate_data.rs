use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::ToSchema;

use crate::dates::iso_date;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
    #[error("Dataset contains no measurements")]
    EmptyDataset,
    #[error("Stored date is not in YYYY-MM-DD format: {0}")]
    MalformedDate(String),
    #[error("Table '{table}' is missing required column '{column}'")]
    SchemaMismatch { table: String, column: String },
}

/// Read-only query primitives over the measurement and station tables.
///
/// Every date argument is compared against the stored `YYYY-MM-DD` text, so
/// "on or after" and range bounds are inclusive calendar comparisons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClimateData: Send + Sync {
    /// Most recent measurement date across all stations
    async fn latest_date(&self) -> Result<Date, Error>;
    /// Precipitation rows with `date >= since`, ascending by date
    async fn measurements_on_or_after(&self, since: Date)
        -> Result<Vec<PrecipitationReading>, Error>;
    /// Stations that have at least one measurement, ascending by station id
    async fn stations_with_names(&self) -> Result<Vec<StationName>, Error>;
    /// Station with the most temperature observations, ties go to the lowest id
    async fn most_active_station(&self) -> Result<String, Error>;
    async fn latest_date_for_station(&self, station: &str) -> Result<Option<Date>, Error>;
    /// Non-null temperature observations for `station` with `date >= since`
    async fn temperature_observations(&self, station: &str, since: Date)
        -> Result<Vec<f64>, Error>;
    /// Min/avg/max temperature over `start..=end` for all stations
    async fn aggregate_temperatures(
        &self,
        start: Date,
        end: Date,
    ) -> Result<TemperatureAggregate, Error>;
    async fn health_check(&self) -> Result<(), Error>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct PrecipitationReading {
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date, example = "2017-08-23")]
    pub date: Date,
    /// Precipitation in inches, null when the station did not report
    pub precipitation: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct StationName {
    #[schema(example = "USC00519281")]
    pub station: String,
    #[schema(example = "WAIHEE 837.5, HI US")]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct TemperatureAggregate {
    pub tmin: Option<f64>,
    pub tavg: Option<f64>,
    pub tmax: Option<f64>,
}

impl TemperatureAggregate {
    pub fn is_empty(&self) -> bool {
        self.tmin.is_none() && self.tavg.is_none() && self.tmax.is_none()
    }
}
