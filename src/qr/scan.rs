//! QR Scanning
//!
//! Decoding is delegated to a [`QrDetector`]. With `auto_resize` the image
//! is retried at a ladder of sizes when nothing is found at native size.

use image::imageops::FilterType;
use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::encoding;
use crate::error::ServiceError;

/// Target lengths of the longest side tried by auto-resize, in order
pub const AUTO_RESIZE_STEPS: [u32; 5] = [100, 395, 690, 985, 1280];

fn default_true() -> bool { true }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrScanRequest {
    pub image: String,
    #[serde(default = "default_true")]
    pub auto_resize: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrScanResponse {
    pub codes: Vec<String>,
    pub count: usize,
    pub success: bool,
}

/// Black-box QR finder/decoder
pub trait QrDetector: Send + Sync {
    /// Decoded payloads of every symbol found, possibly empty
    fn detect(&self, image: &GrayImage) -> Vec<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDetector;

impl QrDetector for RqrrDetector {
    fn detect(&self, image: &GrayImage) -> Vec<String> {
        let (width, height) = image.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            image.get_pixel(x as u32, y as u32).0[0]
        });

        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| match grid.decode() {
                Ok((meta, content)) => {
                    tracing::debug!(
                        version = ?meta.version,
                        ecc_level = meta.ecc_level,
                        length = content.len(),
                        "decoded QR symbol"
                    );
                    Some(content)
                }
                Err(e) => {
                    tracing::debug!("failed to decode one QR grid: {:?}", e);
                    None
                }
            })
            .collect()
    }
}

/// Rescale so the longest side equals `target`, keeping the aspect ratio
fn rescale(image: &GrayImage, target: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    let longest = w.max(h);
    let scale = |side: u32| ((u64::from(side) * u64::from(target) / u64::from(longest)) as u32).max(1);
    image::imageops::resize(image, scale(w), scale(h), FilterType::Triangle)
}

fn dedupe(codes: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(codes.len());
    for code in codes {
        if !unique.contains(&code) {
            unique.push(code);
        }
    }
    unique
}

fn detect_with_resize(image: &GrayImage, auto_resize: bool, detector: &dyn QrDetector) -> Vec<String> {
    let codes = detector.detect(image);
    if !codes.is_empty() || !auto_resize {
        return codes;
    }
    AUTO_RESIZE_STEPS
        .iter()
        .filter(|&&target| target != image.width().max(image.height()))
        .map(|&target| detector.detect(&rescale(image, target)))
        .find(|codes| !codes.is_empty())
        .unwrap_or_default()
}

pub fn scan(request: &QrScanRequest, detector: &dyn QrDetector) -> Result<QrScanResponse, ServiceError> {
    let bytes = encoding::decode_payload(&request.image).map_err(|e| ServiceError::InvalidImage(e.to_string()))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| ServiceError::InvalidImage(e.to_string()))?
        .to_luma8();

    let codes = dedupe(detect_with_resize(&image, request.auto_resize, detector));
    if codes.is_empty() {
        return Err(ServiceError::NoQrCodeFound);
    }
    tracing::info!(count = codes.len(), "decoded QR code(s)");
    Ok(QrScanResponse {
        count: codes.len(),
        codes,
        success: true,
    })
}
