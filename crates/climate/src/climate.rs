//! Query logic behind the API routes.
//!
//! Everything here is a single pass over the immutable dataset: derive a window
//! or validate a range, ask the store, shape the result.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;
use utoipa::ToSchema;

use crate::{
    dates::{iso_date, parse_date, trailing_year_start, InvalidDateFormat},
    db::{self, ClimateData, PrecipitationReading, StationName, TemperatureAggregate},
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Input for start date not recognized as date format.")]
    InvalidStartDate(#[source] InvalidDateFormat),
    #[error("Input for end date not recognized as date format.")]
    InvalidEndDate(#[source] InvalidDateFormat),
    #[error("No data recorded for input date period. Last date on record is {last_date}")]
    NoDataInRange { last_date: Date },
    #[error("No measurements recorded for station {0}")]
    NoDataForStation(String),
    #[error("{0}")]
    Storage(#[from] db::Error),
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // caller mistakes are reported as 404
        let status = match &self {
            Error::InvalidStartDate(_) | Error::InvalidEndDate(_) | Error::NoDataInRange { .. } => {
                warn!("rejected climate query: {}", self);
                StatusCode::NOT_FOUND
            }
            Error::NoDataForStation(_) | Error::Storage(_) => {
                error!("error answering climate query: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Date range for a temperature summary, as received in the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    /// From `start` to the last recorded date
    From { start: String },
    Between { start: String, end: String },
}

impl RangeRequest {
    pub fn start(&self) -> &str {
        match self {
            RangeRequest::From { start } | RangeRequest::Between { start, .. } => start,
        }
    }

    pub fn end(&self) -> Option<&str> {
        match self {
            RangeRequest::From { .. } => None,
            RangeRequest::Between { end, .. } => Some(end.as_str()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct RangeSummary {
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date, example = "2017-06-01")]
    pub begin: Date,
    /// Requested end, clamped to the last recorded date
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date, example = "2017-06-05")]
    pub end: Date,
    pub temps: TemperatureAggregate,
}

pub struct ClimateQueries {
    store: Arc<dyn ClimateData>,
}

impl ClimateQueries {
    pub fn new(store: Arc<dyn ClimateData>) -> Self {
        Self { store }
    }

    /// Precipitation for the year ending at the last recorded date, oldest first.
    pub async fn precipitation_series(&self) -> Result<Vec<PrecipitationReading>, Error> {
        let latest = self.store.latest_date().await?;
        let window_start = trailing_year_start(latest);
        debug!("precipitation window {} to {}", window_start, latest);

        Ok(self.store.measurements_on_or_after(window_start).await?)
    }

    pub async fn station_list(&self) -> Result<Vec<StationName>, Error> {
        Ok(self.store.stations_with_names().await?)
    }

    /// Temperature observations of the most active station over its own last year.
    pub async fn recent_temperatures(&self) -> Result<Vec<f64>, Error> {
        let station = self.store.most_active_station().await?;
        let latest = self
            .store
            .latest_date_for_station(&station)
            .await?
            .ok_or_else(|| Error::NoDataForStation(station.clone()))?;
        let window_start = trailing_year_start(latest);
        debug!(
            "temperature window for {}: {} to {}",
            station, window_start, latest
        );

        Ok(self
            .store
            .temperature_observations(&station, window_start)
            .await?)
    }

    /// Min/avg/max temperature across all stations for the requested range.
    ///
    /// Both dates are validated before the store is touched. The end defaults
    /// to, and is clamped at, the last recorded date; a start past that date is
    /// an error. A range with no rows yields null temperatures.
    pub async fn range_summary(&self, request: &RangeRequest) -> Result<RangeSummary, Error> {
        let start = parse_date(request.start()).map_err(Error::InvalidStartDate)?;
        let requested_end = request
            .end()
            .map(parse_date)
            .transpose()
            .map_err(Error::InvalidEndDate)?;

        let last_date = self.store.latest_date().await?;
        if start > last_date {
            return Err(Error::NoDataInRange { last_date });
        }

        let end = requested_end.map_or(last_date, |end| end.min(last_date));
        debug!("temperature summary for {} to {}", start, end);

        let temps = self.store.aggregate_temperatures(start, end).await?;
        Ok(RangeSummary {
            begin: start,
            end,
            temps,
        })
    }
}
