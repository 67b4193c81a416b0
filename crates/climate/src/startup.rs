use crate::{
    climate::{ClimateQueries, ErrorResponse, RangeSummary},
    db::{
        self, ClimateData, ClimateDatabase, PrecipitationReading, StationName,
        TemperatureAggregate,
    },
    dates::format_date,
    health, index_handler, precipitation, routes, stations, summary_between, summary_from,
    temperature_observations,
};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use climate_core::require_file;
use hyper::{header::ACCEPT, Method};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub climate_db: Arc<dyn ClimateData>,
    pub queries: Arc<ClimateQueries>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::api::climate_routes::precipitation,
        routes::api::climate_routes::stations,
        routes::api::climate_routes::temperature_observations,
        routes::api::climate_routes::summary_from,
        routes::api::climate_routes::summary_between,
        routes::api::health::health,
    ),
    components(
        schemas(
            PrecipitationReading,
            StationName,
            TemperatureAggregate,
            RangeSummary,
            ErrorResponse,
            routes::api::health::HealthStatus,
        )
    ),
    tags(
        (name = "hawaii climate api", description = "a read-only RESTful api over historical Hawaii precipitation and temperature observations")
    )
)]
struct ApiDoc;

/// Open the dataset read-only and make sure it can answer queries.
///
/// An empty dataset is treated as a configuration error here rather than
/// surfacing as a failure on every request.
pub async fn open_dataset(
    path: &str,
    max_connections: u32,
) -> Result<ClimateDatabase, anyhow::Error> {
    let path = require_file(path)?;
    let db = ClimateDatabase::open(&path, max_connections)
        .await
        .with_context(|| format!("error opening dataset {}", path.display()))?;

    match db.latest_date().await {
        Ok(latest) => {
            info!("dataset records measurements through {}", format_date(latest));
            Ok(db)
        }
        Err(db::Error::EmptyDataset) => {
            db.close().await;
            Err(anyhow!("dataset {} has no measurements", path.display()))
        }
        Err(e) => {
            db.close().await;
            Err(anyhow!("error reading dataset {}: {}", path.display(), e))
        }
    }
}

pub fn build_app_state(remote_url: String, climate_db: Arc<dyn ClimateData>) -> AppState {
    let queries = Arc::new(ClimateQueries::new(climate_db.clone()));
    AppState {
        remote_url,
        climate_db,
        queries,
    }
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(temperature_observations))
        .route("/api/v1.0/{start}", get(summary_from))
        .route("/api/v1.0/{start}/{end}", get(summary_between))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_owned();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, {} code: {}, time: {}", path, response.status().as_str(), response_time);

    response
}
