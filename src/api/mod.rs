//! HTTP API
//!
//! Thin handlers over the library operations. CPU-heavy work (rendering,
//! scanning, file hashing, strength estimation) runs on the blocking pool.

mod hash;
mod password;
mod qr;

use std::io;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, FromRequest, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::error::ServiceError;
use crate::password::{StrengthEstimator, ZxcvbnEstimator};
use crate::qr::{QrDetector, QrPipeline, RqrrDetector, ScratchDir};
use crate::validation::ValidationViolation;
use crate::SERVICE_VERSION;

/// Shared, read-only handler state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub qr: Arc<QrPipeline>,
    pub estimator: Arc<dyn StrengthEstimator>,
    pub detector: Arc<dyn QrDetector>,
}

impl AppState {
    /// Creates the scratch directory as a side effect
    pub fn new(settings: Settings) -> io::Result<Self> {
        let scratch = ScratchDir::create(&settings.scratch_dir)?;
        Ok(Self {
            settings: Arc::new(settings),
            qr: Arc::new(QrPipeline::new(scratch)),
            estimator: Arc::new(ZxcvbnEstimator),
            detector: Arc::new(RqrrDetector),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.settings.max_body_bytes;
    let api = Router::new()
        .route("/qr/generate", post(qr::generate))
        .route("/qr/scan", post(qr::scan))
        .route("/qr/module-drawers", get(qr::module_drawers))
        .route("/qr/color-masks", get(qr::color_masks))
        .route("/qr/error-correction-levels", get(qr::error_correction_levels))
        .route("/hash/generate", post(hash::generate))
        .route("/hash/verify", post(hash::verify))
        .route("/hash/file", post(hash::file))
        .route("/hash/algorithms", get(hash::algorithms))
        .route("/password/generate", post(password::generate))
        .route("/password/analyze", post(password::analyze));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api.clone())
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Artifice Toolkit API",
        "debug": state.settings.debug,
        "version": SERVICE_VERSION,
    }))
}

// GET routes answer HEAD as well
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// JSON body extractor whose rejections become `validation_error`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation(vec![ValidationViolation::new("body", rejection.body_text())])
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.is_internal() {
            tracing::error!(error = %self, "internal error");
        } else {
            tracing::warn!(code = self.code(), "request rejected: {}", self);
        }
        let body = json!({
            "code": self.code(),
            "message": self.public_message(),
            "context": self.context(),
        });
        (status, Json(body)).into_response()
    }
}

/// Run CPU-bound work off the async executor
async fn blocking<T, F>(work: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(ServiceError::internal)?
}
