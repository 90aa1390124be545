use axum::Json;

use crate::api::{blocking, ApiJson};
use crate::error::ServiceError;
use crate::hashing::{
    self, AlgorithmInfo, HashFileRequest, HashFileResponse, HashGenerateRequest, HashGenerateResponse,
    HashVerifyRequest, HashVerifyResponse,
};

pub(super) async fn generate(
    ApiJson(request): ApiJson<HashGenerateRequest>,
) -> Result<Json<HashGenerateResponse>, ServiceError> {
    hashing::generate(&request).map(Json)
}

pub(super) async fn verify(
    ApiJson(request): ApiJson<HashVerifyRequest>,
) -> Result<Json<HashVerifyResponse>, ServiceError> {
    hashing::verify(&request).map(Json)
}

/// Files can be up to 50 MiB, so digesting happens off the executor
pub(super) async fn file(
    ApiJson(request): ApiJson<HashFileRequest>,
) -> Result<Json<HashFileResponse>, ServiceError> {
    blocking(move || hashing::hash_file(&request)).await.map(Json)
}

pub(super) async fn algorithms() -> Json<Vec<AlgorithmInfo>> {
    Json(hashing::algorithm_catalog())
}
