use axum::{
    extract::{
        path::ErrorKind,
        rejection::PathRejection,
        Path, State,
    },
    Json,
};
use std::sync::Arc;

use crate::{
    climate::{Error, ErrorResponse, RangeRequest, RangeSummary},
    dates::InvalidDateFormat,
    AppState, PrecipitationReading, StationName,
};

/// Path segments that cannot be read as text (e.g. percent-encoded non UTF-8)
/// are reported the same way as any other malformed date.
fn invalid_path_date(rejection: PathRejection) -> Error {
    let is_end = match &rejection {
        PathRejection::FailedToDeserializePathParams(failed) => matches!(
            failed.kind(),
            ErrorKind::InvalidUtf8InPathParam { key } if key == "end"
        ),
        _ => false,
    };
    let detail = InvalidDateFormat(rejection.body_text());
    if is_end {
        Error::InvalidEndDate(detail)
    } else {
        Error::InvalidStartDate(detail)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation for the last year of data, oldest first", body = Vec<PrecipitationReading>),
        (status = INTERNAL_SERVER_ERROR, description = "Dataset could not be read", body = ErrorResponse)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationReading>>, Error> {
    state.queries.precipitation_series().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Stations that recorded at least one measurement", body = Vec<StationName>),
        (status = INTERNAL_SERVER_ERROR, description = "Dataset could not be read", body = ErrorResponse)
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StationName>>, Error> {
    state.queries.station_list().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Last year of temperature observations from the most active station, unsorted", body = Vec<f64>),
        (status = INTERNAL_SERVER_ERROR, description = "Dataset could not be read", body = ErrorResponse)
    ))]
pub async fn temperature_observations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<f64>>, Error> {
    state.queries.recent_temperatures().await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "First day of the range, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature summary from start to the last recorded date", body = RangeSummary),
        (status = NOT_FOUND, description = "Start is not a YYYY-MM-DD date or is after the last recorded date", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Dataset could not be read", body = ErrorResponse)
    ))]
pub async fn summary_from(
    State(state): State<Arc<AppState>>,
    start: Result<Path<String>, PathRejection>,
) -> Result<Json<RangeSummary>, Error> {
    let Path(start) = start.map_err(invalid_path_date)?;
    state
        .queries
        .range_summary(&RangeRequest::From { start })
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "First day of the range, YYYY-MM-DD"),
        ("end" = String, Path, description = "Last day of the range, YYYY-MM-DD, clamped to the last recorded date"),
    ),
    responses(
        (status = OK, description = "Temperature summary for the inclusive range", body = RangeSummary),
        (status = NOT_FOUND, description = "A date is not YYYY-MM-DD or start is after the last recorded date", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Dataset could not be read", body = ErrorResponse)
    ))]
pub async fn summary_between(
    State(state): State<Arc<AppState>>,
    dates: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<RangeSummary>, Error> {
    let Path((start, end)) = dates.map_err(invalid_path_date)?;
    state
        .queries
        .range_summary(&RangeRequest::Between { start, end })
        .await
        .map(Json)
}
