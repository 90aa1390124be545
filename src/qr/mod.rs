//! QR code generation and scanning

pub mod catalog;
pub mod drawers;
pub mod encoders;
pub mod masks;
pub mod matrix;
pub mod pipeline;
pub mod scan;
pub mod scratch;

pub use drawers::{EyeDrawerConfig, ModuleDrawer, ModuleDrawerConfig, ModuleDrawerType};
pub use masks::{ColorMask, ColorMaskConfig, ColorMaskType};
pub use matrix::{ErrorCorrection, SymbolMatrix};
pub use pipeline::{ImageSize, OutputFormat, QrPipeline, QrRenderOutput, QrRenderRequest};
pub use scan::{QrDetector, QrScanRequest, QrScanResponse, RqrrDetector};
pub use scratch::{ScratchDir, ScratchFile};
