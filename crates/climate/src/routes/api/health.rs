use axum::{extract::State, http::StatusCode, Json};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{climate::ErrorResponse, AppState};

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Dataset is reachable", body = HealthStatus),
        (status = SERVICE_UNAVAILABLE, description = "Dataset could not be queried", body = ErrorResponse)
    ))]
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthStatus>, (StatusCode, Json<ErrorResponse>)> {
    state.climate_db.health_check().await.map_err(|e| {
        error!("health check failed: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(HealthStatus {
        status: String::from("ok"),
    }))
}
