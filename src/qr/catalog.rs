//! Static capability listings for clients building generation forms

use serde::Serialize;

use crate::qr::drawers::ModuleDrawerType;
use crate::qr::masks::ColorMaskType;
use crate::qr::matrix::ErrorCorrection;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleDrawerInfo {
    #[serde(rename = "type")]
    pub kind: ModuleDrawerType,
    pub description: &'static str,
    pub supports_size_ratio: bool,
    pub supports_radius_ratio: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleDrawerListing {
    pub module_drawers: Vec<ModuleDrawerInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorMaskInfo {
    #[serde(rename = "type")]
    pub kind: ColorMaskType,
    pub description: &'static str,
    pub params: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorMaskListing {
    pub color_masks: Vec<ColorMaskInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorCorrectionInfo {
    pub code: ErrorCorrection,
    pub recovery: String,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorCorrectionListing {
    pub levels: Vec<ErrorCorrectionInfo>,
}

fn drawer_description(kind: ModuleDrawerType) -> &'static str {
    match kind {
        ModuleDrawerType::Square => "Standard square modules",
        ModuleDrawerType::GappedSquare => "Square modules with gaps",
        ModuleDrawerType::Circle => "Circular modules",
        ModuleDrawerType::Rounded => "Rounded corner modules",
        ModuleDrawerType::VerticalBars => "Vertical bar modules",
        ModuleDrawerType::HorizontalBars => "Horizontal bar modules",
    }
}

fn mask_description(kind: ColorMaskType) -> &'static str {
    match kind {
        ColorMaskType::Solid => "Solid fill color",
        ColorMaskType::RadialGradient => "Radial gradient from center",
        ColorMaskType::SquareGradient => "Square gradient from center",
        ColorMaskType::HorizontalGradient => "Horizontal gradient",
        ColorMaskType::VerticalGradient => "Vertical gradient",
        ColorMaskType::Image => "Image-based coloring",
    }
}

fn level_description(level: ErrorCorrection) -> &'static str {
    match level {
        ErrorCorrection::L => "Low - About 7% or less errors can be corrected",
        ErrorCorrection::M => "Medium (default) - About 15% or less errors can be corrected",
        ErrorCorrection::Q => "Quartile - About 25% or less errors can be corrected",
        ErrorCorrection::H => "High - About 30% or less errors can be corrected (recommended for embedded images)",
    }
}

pub fn module_drawers() -> ModuleDrawerListing {
    ModuleDrawerListing {
        module_drawers: ModuleDrawerType::ALL
            .into_iter()
            .map(|kind| ModuleDrawerInfo {
                kind,
                description: drawer_description(kind),
                supports_size_ratio: kind.supports_size_ratio(),
                supports_radius_ratio: kind.supports_radius_ratio(),
            })
            .collect(),
    }
}

pub fn color_masks() -> ColorMaskListing {
    ColorMaskListing {
        color_masks: ColorMaskType::ALL
            .into_iter()
            .map(|kind| ColorMaskInfo {
                kind,
                description: mask_description(kind),
                params: kind.params(),
            })
            .collect(),
    }
}

pub fn error_correction_levels() -> ErrorCorrectionListing {
    ErrorCorrectionListing {
        levels: ErrorCorrection::ALL
            .into_iter()
            .map(|level| ErrorCorrectionInfo {
                code: level,
                recovery: format!("~{}%", level.recovery_percent()),
                description: level_description(level),
            })
            .collect(),
    }
}
