use axum::extract::State;
use axum::Json;

use crate::api::{blocking, ApiJson, AppState};
use crate::error::ServiceError;
use crate::qr::catalog::{self, ColorMaskListing, ErrorCorrectionListing, ModuleDrawerListing};
use crate::qr::scan::{self as scanner, QrScanRequest, QrScanResponse};
use crate::qr::{QrRenderOutput, QrRenderRequest};

pub(super) async fn generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QrRenderRequest>,
) -> Result<Json<QrRenderOutput>, ServiceError> {
    let pipeline = state.qr.clone();
    let output = blocking(move || pipeline.generate(&request)).await?;
    Ok(Json(output))
}

pub(super) async fn scan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QrScanRequest>,
) -> Result<Json<QrScanResponse>, ServiceError> {
    let detector = state.detector.clone();
    let response = blocking(move || scanner::scan(&request, detector.as_ref())).await?;
    Ok(Json(response))
}

pub(super) async fn module_drawers() -> Json<ModuleDrawerListing> {
    Json(catalog::module_drawers())
}

pub(super) async fn color_masks() -> Json<ColorMaskListing> {
    Json(catalog::color_masks())
}

pub(super) async fn error_correction_levels() -> Json<ErrorCorrectionListing> {
    Json(catalog::error_correction_levels())
}
