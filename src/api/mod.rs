//! HTTP façade: `POST /predict` and the `GET /` health check.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

use crate::data::validation::validate_hour;
use crate::predictor::{PredictionError, PredictionRequest, PredictionResponse, PredictionService};

const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
}

/// Request body for `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    /// Date for prediction in YYYY-MM-DD format
    pub target_date: String,
    /// Hour of the day (0-23)
    pub target_hour: i64,
    /// True if there is a special local event
    pub is_special_event: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

/// Error body: `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/predict", post(create_prediction))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        message: "Prediction API is running. POST /predict to get order probabilities.".to_string(),
    })
}

pub async fn create_prediction(
    State(state): State<AppState>,
    payload: Result<Json<PredictionInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        warn!("Rejected prediction request: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;

    // Range check before anything downstream runs
    let target_hour = validate_hour(input.target_hour).map_err(|e| {
        warn!("Rejected prediction request: {}", e);
        ApiError::bad_request(e.to_string())
    })?;

    let request = PredictionRequest {
        target_date: input.target_date,
        target_hour,
        is_special_event: input.is_special_event,
    };

    match state.service.predict(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            if err.is_client_error() {
                warn!("Prediction failed: {}", err);
            } else {
                error!("Prediction failed with fatal model error: {}", err);
            }
            Err(ApiError::from(err))
        }
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, service: PredictionService) -> anyhow::Result<()> {
    let app = create_router(AppState { service });
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🌐 Prediction API listening on http://{}", addr);
    info!("   GET  /         - Health check");
    info!("   POST /predict  - Order probabilities per menu item");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
