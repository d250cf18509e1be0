//! HTTP API server exposing the simulated translation API

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::api::TranslationApi;
use crate::core::errors::TranslationError;
use crate::core::http::{ErrorResponse, FetchQuery, SubmitBody, SubmitReply};
use crate::core::storage::SpaceApi;

/// Application state
#[derive(Clone)]
pub struct AppState {
    api: SpaceApi,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Translation error carried to the wire
struct ApiFailure(TranslationError);

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TranslationError::NotAvailable { .. } => StatusCode::NOT_FOUND,
            TranslationError::Untranslatable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TranslationError::AbusiveClient => StatusCode::FORBIDDEN,
            TranslationError::RequestFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Stored translation lookup
async fn fetch_translation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FetchQuery>,
) -> Result<Json<crate::core::models::Fetched>, ApiFailure> {
    state.api.fetch(&query.text).await.map(Json).map_err(ApiFailure)
}

/// Translation request submission
async fn submit_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<SubmitReply>, ApiFailure> {
    match state.api.request(&body.text).await {
        Ok(()) => Ok(Json(SubmitReply {
            status: "accepted".to_string(),
        })),
        Err(e) => {
            warn!("Request for '{}' failed: {}", body.text, e);
            Err(ApiFailure(e))
        }
    }
}

/// Build the router around a simulated API
pub fn router(api: SpaceApi) -> Router {
    let state = Arc::new(AppState { api });

    Router::new()
        .route("/", get(health_check))
        .route("/v1/translations", get(fetch_translation))
        .route("/v1/requests", post(submit_request))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16, api: SpaceApi) -> anyhow::Result<()> {
    let app = router(api);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
