/// HTTP surface for the claims engine.
///
/// Exposes two routes:
/// - `POST /upload`: multipart form with a `file` part holding a CSV batch
/// - `GET /health`: liveness and version
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use claims_engine::analyzer::BatchAnalyzer;
use claims_engine::model::BatchReport;

use crate::config::Config;
use crate::error::ApiError;
use crate::ingest;

const FILE_FIELD: &str = "file";

/// Shared across requests. Read-only: each upload builds its own report.
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<BatchAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: Arc<BatchAnalyzer>) -> Self {
        Self { analyzer }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/health", get(health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(config.cors_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: Option<&[axum::http::HeaderValue]>) -> CorsLayer {
    let allow_origin = match origins {
        Some(list) => AllowOrigin::list(list.iter().cloned()),
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchReport>, ApiError> {
    // a request that isn't multipart carries no file
    let mut multipart = multipart.map_err(|_| ApiError::NoFile)?;

    let (file_name, data) = read_file_field(&mut multipart)
        .await?
        .ok_or(ApiError::NoFile)?;
    if file_name.is_empty() || !file_name.ends_with(".csv") {
        return Err(ApiError::InvalidFile);
    }
    info!(file_name = %file_name, bytes = data.len(), "claims upload received");

    // parse and analyze off the async workers; the batch is all-or-nothing
    let analyzer = Arc::clone(&state.analyzer);
    let report = tokio::task::spawn_blocking(move || -> Result<BatchReport, ApiError> {
        let claims = ingest::parse_claims(&data)?;
        Ok(analyzer.analyze(&claims))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(report))
}

/// First part named `file` that carries a filename. Parts without one are
/// plain form values, not uploads.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<(String, Bytes)>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        return Ok(Some((file_name, data)));
    }
    Ok(None)
}
