//! Service Errors - One Variant Per Stable Code
//!
//! Request errors carry a machine-readable code and optional context.
//! Internal errors keep their detail for the server log only.

use serde_json::{json, Value};
use thiserror::Error;

use crate::validation::ValidationViolation;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationViolation>),

    #[error("Styled image options require use_styled_image=true")]
    StyledImageRequired { fields: Vec<&'static str> },

    #[error("final_size is only supported for PNG output")]
    FinalSizePngOnly { output_format: String },

    #[error("Pure black background (#000000) cannot be used with Image Pattern mode. Use a lighter color.")]
    InvalidColorCombination,

    #[error("Invalid color_mask_image data")]
    InvalidColorMaskImage(String),

    #[error("Invalid embedded_image data")]
    InvalidEmbeddedImage(String),

    #[error("Unsupported {role} drawer: {kind}")]
    UnsupportedDrawer { role: &'static str, kind: &'static str },

    #[error("Data too long for a QR code at error correction level {level}")]
    DataTooLong { level: char, length: usize },

    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Cannot detect hash format")]
    InvalidHashFormat,

    #[error("Invalid base64 file data")]
    InvalidFileData(String),

    #[error("File exceeds the maximum size of {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize, actual_bytes: usize },

    #[error("At least one character type must be enabled")]
    InvalidCharacterTypes,

    #[error("Invalid image data provided")]
    InvalidImage(String),

    #[error("No QR codes found in image")]
    NoQrCodeFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(violations: &[ValidationViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::StyledImageRequired { .. } => "styled_image_required",
            Self::FinalSizePngOnly { .. } => "final_size_png_only",
            Self::InvalidColorCombination => "invalid_color_combination",
            Self::InvalidColorMaskImage(_) => "invalid_color_mask_image",
            Self::InvalidEmbeddedImage(_) => "invalid_embedded_image",
            Self::UnsupportedDrawer { .. } => "unsupported_drawer",
            Self::DataTooLong { .. } => "data_too_long",
            Self::UnknownAlgorithm(_) => "unknown_algorithm",
            Self::InvalidHashFormat => "invalid_hash_format",
            Self::InvalidFileData(_) => "invalid_file_data",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::InvalidCharacterTypes => "invalid_character_types",
            Self::InvalidImage(_) => "invalid_image",
            Self::NoQrCodeFound => "no_qr_code_found",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status the error maps to
    pub fn status(&self) -> u16 {
        match self {
            Self::NoQrCodeFound => 404,
            Self::Internal(_) => 500,
            _ => 400,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Human-readable message safe to show to callers
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Extra structured detail for the caller. Never populated for internal errors.
    pub fn context(&self) -> Value {
        match self {
            Self::Validation(violations) => json!({ "violations": violations }),
            Self::StyledImageRequired { fields } => json!({ "fields": fields }),
            Self::FinalSizePngOnly { output_format } => json!({ "output_format": output_format }),
            Self::InvalidColorMaskImage(reason)
            | Self::InvalidEmbeddedImage(reason)
            | Self::InvalidFileData(reason)
            | Self::InvalidImage(reason) => json!({ "error": reason }),
            Self::UnsupportedDrawer { role, kind } => json!({ "role": role, "type": kind }),
            Self::DataTooLong { level, length } => {
                json!({ "error_correction": level.to_string(), "length": length })
            }
            Self::UnknownAlgorithm(_) => {
                let supported: Vec<_> = crate::hashing::HashAlgorithm::ALL.iter().map(|a| a.name()).collect();
                json!({ "supported": supported })
            }
            Self::FileTooLarge { max_bytes, actual_bytes } => {
                json!({ "max_bytes": max_bytes, "actual_bytes": actual_bytes })
            }
            _ => json!({}),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::NoQrCodeFound.status(), 404);
        assert_eq!(ServiceError::InvalidHashFormat.status(), 400);
        assert_eq!(ServiceError::internal("boom").status(), 500);
    }

    #[test]
    fn test_internal_detail_not_public() {
        let err = ServiceError::internal("disk exploded at /secret/path");
        assert!(!err.public_message().contains("/secret/path"));
        assert_eq!(err.context(), json!({}));
        assert_eq!(err.code(), "internal_error");
    }

    #[test]
    fn test_validation_context_lists_violations() {
        let err = ServiceError::Validation(vec![ValidationViolation::new("box_size", "out of range")]);
        let ctx = err.context();
        assert_eq!(ctx["violations"][0]["field"], "box_size");
        assert!(err.to_string().contains("box_size: out of range"));
    }
}
