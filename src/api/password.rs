use axum::extract::State;
use axum::Json;

use crate::api::{blocking, ApiJson, AppState};
use crate::error::ServiceError;
use crate::password::{
    self, PasswordAnalyzeRequest, PasswordAnalyzeResponse, PasswordGenerateRequest, PasswordGenerateResponse,
};

pub(super) async fn generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PasswordGenerateRequest>,
) -> Result<Json<PasswordGenerateResponse>, ServiceError> {
    let estimator = state.estimator.clone();
    blocking(move || password::generate(&request, estimator.as_ref()))
        .await
        .map(Json)
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PasswordAnalyzeRequest>,
) -> Result<Json<PasswordAnalyzeResponse>, ServiceError> {
    let estimator = state.estimator.clone();
    blocking(move || password::analyze(&request, estimator.as_ref()))
        .await
        .map(Json)
}
