//! Artifice Core - Developer Utility Service
//!
//! # Guarantees
//! 1. Every request is validated before any work is done
//! 2. Request errors carry a stable code; internal detail never leaves the server
//! 3. Hash verification compares in constant time
//! 4. Passwords come from the OS CSPRNG
//! 5. Scratch files never outlive the render that staged them

pub mod api;
pub mod color;
pub mod config;
pub mod encoding;
pub mod error;
pub mod hashing;
pub mod password;
pub mod qr;
pub mod validation;

pub use color::{HexColor, Rgb};
pub use config::Settings;
pub use error::{Result, ServiceError};
pub use hashing::{generate_hash, HashAlgorithm, OutputEncoding};
pub use password::{StrengthEstimator, ZxcvbnEstimator};
pub use qr::{QrPipeline, QrRenderOutput, QrRenderRequest};
pub use validation::{Validate, ValidationRule, ValidationViolation};

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
