//! QR Rendering Pipeline - Single Entry Point
//!
//! CRITICAL: generate MUST call validate_request internally. No bypass.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::color::{resolve_or, HexColor, Rgb};
use crate::encoding;
use crate::error::ServiceError;
use crate::qr::drawers::{select_eye_drawer, select_module_drawer, EyeDrawerConfig, ModuleDrawerConfig};
use crate::qr::encoders::{self, SvgVariant};
use crate::qr::masks::{build_color_mask, ColorMaskConfig};
use crate::qr::matrix::{ErrorCorrection, SymbolMatrix, MAX_VERSION, MIN_VERSION};
use crate::qr::scratch::ScratchDir;
use crate::validation::{LengthRule, RangeRule, Validate, Violations};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    SvgPath,
    SvgFragment,
    Ascii,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [Self::Png, Self::Svg, Self::SvgPath, Self::SvgFragment, Self::Ascii];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::SvgPath => "svg-path",
            Self::SvgFragment => "svg-fragment",
            Self::Ascii => "ascii",
        }
    }

    pub fn is_raster(&self) -> bool {
        matches!(self, Self::Png)
    }
}

fn default_box_size() -> u32 { 10 }
fn default_border() -> u32 { 4 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrRenderRequest {
    pub data: String,
    #[serde(default)]
    pub version: Option<i16>,
    #[serde(default = "default_box_size")]
    pub box_size: u32,
    #[serde(default = "default_border")]
    pub border: u32,
    #[serde(default)]
    pub error_correction: ErrorCorrection,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub final_size: Option<u32>,
    #[serde(default)]
    pub fill_color: Option<HexColor>,
    #[serde(default)]
    pub back_color: Option<HexColor>,
    #[serde(default)]
    pub use_styled_image: bool,
    #[serde(default)]
    pub module_drawer: Option<ModuleDrawerConfig>,
    #[serde(default)]
    pub eye_drawer: Option<EyeDrawerConfig>,
    #[serde(default)]
    pub color_mask: Option<ColorMaskConfig>,
    #[serde(default)]
    pub embedded_image: Option<String>,
}

impl QrRenderRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            version: None,
            box_size: default_box_size(),
            border: default_border(),
            error_correction: ErrorCorrection::default(),
            output_format: OutputFormat::default(),
            final_size: None,
            fill_color: None,
            back_color: None,
            use_styled_image: false,
            module_drawer: None,
            eye_drawer: None,
            color_mask: None,
            embedded_image: None,
        }
    }

    /// Styling fields that were supplied
    fn styling_fields(&self) -> Vec<&'static str> {
        [
            ("module_drawer", self.module_drawer.is_some()),
            ("eye_drawer", self.eye_drawer.is_some()),
            ("color_mask", self.color_mask.is_some()),
            ("embedded_image", self.embedded_image.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

impl Validate for QrRenderRequest {
    fn collect_violations(&self, violations: &mut Violations) {
        violations
            .check(&LengthRule::new("data", 1, 3000), self.data.as_str())
            .check_opt(&RangeRule::new("version", MIN_VERSION, MAX_VERSION), self.version.as_ref())
            .check(&RangeRule::new("box_size", 1u32, 100), &self.box_size)
            .check(&RangeRule::new("border", 0u32, 20), &self.border)
            .check_opt(&RangeRule::new("final_size", 100u32, 2000), self.final_size.as_ref());
        if let Some(drawer) = &self.module_drawer {
            violations.check_opt(
                &RangeRule::new("module_drawer.size_ratio", 0.1, 1.0),
                drawer.size_ratio.as_ref(),
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Rendered artifact: base64 PNG for raster output, the raw text otherwise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrRenderOutput {
    pub image: String,
    pub format: OutputFormat,
    pub size: Option<ImageSize>,
}

/// The rendering pipeline - single entry point for QR generation
#[derive(Debug, Clone)]
pub struct QrPipeline {
    scratch: ScratchDir,
}

impl QrPipeline {
    pub fn new(scratch: ScratchDir) -> Self {
        Self { scratch }
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Field ranges first, then the cross-field rules.
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_request(&self, request: &QrRenderRequest) -> Result<(), ServiceError> {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        request.validate()?;

        let styling = request.styling_fields();
        if !request.use_styled_image && !styling.is_empty() {
            return Err(ServiceError::StyledImageRequired { fields: styling });
        }
        if request.final_size.is_some() && !request.output_format.is_raster() {
            return Err(ServiceError::FinalSizePngOnly {
                output_format: request.output_format.name().to_string(),
            });
        }
        Ok(())
    }

    /// Render a QR code
    ///
    /// CRITICAL: This ALWAYS calls validate_request internally.
    pub fn generate(&self, request: &QrRenderRequest) -> Result<QrRenderOutput, ServiceError> {
        self.validate_request(request)?;

        let matrix = SymbolMatrix::build(&request.data, request.version, request.error_correction)?;
        tracing::info!(
            format = request.output_format.name(),
            version = matrix.version(),
            styled = request.use_styled_image,
            "generating QR code"
        );

        let fill = resolve_or(request.fill_color.as_ref(), Rgb::BLACK);
        let back = resolve_or(request.back_color.as_ref(), Rgb::WHITE);
        let text = |image: String| QrRenderOutput {
            image,
            format: request.output_format,
            size: None,
        };

        match request.output_format {
            OutputFormat::Ascii => Ok(text(encoders::render_ascii(&matrix, request.border))),
            OutputFormat::Svg => Ok(text(self.svg(&matrix, request, SvgVariant::Full, fill, back))),
            OutputFormat::SvgPath => Ok(text(self.svg(&matrix, request, SvgVariant::Path, fill, back))),
            OutputFormat::SvgFragment => Ok(text(self.svg(&matrix, request, SvgVariant::Fragment, fill, back))),
            OutputFormat::Png => {
                let canvas = if request.use_styled_image {
                    self.render_styled(&matrix, request)?
                } else {
                    encoders::render_basic(&matrix, request.border, request.box_size, fill, back)
                };
                let canvas = match request.final_size {
                    Some(side) => image::imageops::resize(&canvas, side, side, FilterType::Lanczos3),
                    None => canvas,
                };
                let png = encoders::encode_png(&canvas)?;
                Ok(QrRenderOutput {
                    image: encoding::encode(&png),
                    format: OutputFormat::Png,
                    size: Some(ImageSize {
                        width: canvas.width(),
                        height: canvas.height(),
                    }),
                })
            }
        }
    }

    fn svg(
        &self,
        matrix: &SymbolMatrix,
        request: &QrRenderRequest,
        variant: SvgVariant,
        fill: Rgb,
        back: Rgb,
    ) -> String {
        encoders::render_svg(matrix, request.border, request.box_size, variant, fill, back)
    }

    fn render_styled(&self, matrix: &SymbolMatrix, request: &QrRenderRequest) -> Result<image::RgbImage, ServiceError> {
        let module_drawer = select_module_drawer(request.module_drawer.as_ref())?;
        let eye_drawer = select_eye_drawer(request.eye_drawer.as_ref())?;
        let mask = build_color_mask(request.color_mask.as_ref())?;

        // The staged file lives until the end of this scope, so it is removed
        // on every exit path below.
        let staged = request
            .embedded_image
            .as_deref()
            .map(|payload| self.scratch.stage_image(payload))
            .transpose()?;
        let logo = staged.as_ref().map(|file| file.load()).transpose()?;

        Ok(encoders::render_styled(
            matrix,
            request.border,
            request.box_size,
            module_drawer.as_ref(),
            eye_drawer.as_ref(),
            mask.as_ref(),
            logo.as_ref(),
        ))
    }
}
