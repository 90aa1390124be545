//! Color Masks
//!
//! A mask picks the foreground color for every pixel of the styled canvas.
//! Pixels are blended between the back color and that foreground color by
//! module coverage.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::color::{resolve_or, HexColor, Rgb};
use crate::encoding;
use crate::error::ServiceError;

pub trait ColorMask: Send + Sync {
    fn name(&self) -> &'static str;

    fn back_color(&self) -> Rgb;

    /// Foreground color at pixel (x, y) of a `width` x `height` canvas
    fn fore_color(&self, x: u32, y: u32, width: u32, height: u32) -> Rgb;

    /// Color the canvas from its coverage map (0 = background, 255 = module)
    fn paint(&self, coverage: &GrayImage) -> RgbImage {
        let (width, height) = coverage.dimensions();
        let back = self.back_color();
        RgbImage::from_fn(width, height, |x, y| {
            let c = coverage.get_pixel(x, y).0[0];
            blend(back, c, || self.fore_color(x, y, width, height))
        })
    }
}

fn blend(back: Rgb, coverage: u8, fore: impl FnOnce() -> Rgb) -> image::Rgb<u8> {
    match coverage {
        0 => back.into(),
        255 => fore().into(),
        c => back.lerp(fore(), f64::from(c) / 255.0).into(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMaskType {
    #[default]
    Solid,
    RadialGradient,
    SquareGradient,
    HorizontalGradient,
    VerticalGradient,
    Image,
}

impl ColorMaskType {
    pub const ALL: [ColorMaskType; 6] = [
        Self::Solid,
        Self::RadialGradient,
        Self::SquareGradient,
        Self::HorizontalGradient,
        Self::VerticalGradient,
        Self::Image,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::RadialGradient => "radial_gradient",
            Self::SquareGradient => "square_gradient",
            Self::HorizontalGradient => "horizontal_gradient",
            Self::VerticalGradient => "vertical_gradient",
            Self::Image => "image",
        }
    }

    /// Request fields each variant reads
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Self::Solid => &["front_color", "back_color"],
            Self::RadialGradient | Self::SquareGradient => &["center_color", "edge_color", "back_color"],
            Self::HorizontalGradient => &["left_color", "right_color", "back_color"],
            Self::VerticalGradient => &["top_color", "bottom_color", "back_color"],
            Self::Image => &["color_mask_image", "back_color"],
        }
    }
}

/// Wire form of a color mask; fields a variant does not use are ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorMaskConfig {
    #[serde(rename = "type", default)]
    pub kind: ColorMaskType,
    #[serde(default)]
    pub front_color: Option<HexColor>,
    #[serde(default)]
    pub back_color: Option<HexColor>,
    #[serde(default)]
    pub center_color: Option<HexColor>,
    #[serde(default)]
    pub edge_color: Option<HexColor>,
    #[serde(default)]
    pub left_color: Option<HexColor>,
    #[serde(default)]
    pub right_color: Option<HexColor>,
    #[serde(default)]
    pub top_color: Option<HexColor>,
    #[serde(default)]
    pub bottom_color: Option<HexColor>,
    #[serde(default)]
    pub color_mask_image: Option<String>,
}

/// A mask variant with its colors resolved and defaults applied
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedMask<'a> {
    Solid { front: Rgb, back: Rgb },
    RadialGradient { center: Rgb, edge: Rgb, back: Rgb },
    SquareGradient { center: Rgb, edge: Rgb, back: Rgb },
    HorizontalGradient { left: Rgb, right: Rgb, back: Rgb },
    VerticalGradient { top: Rgb, bottom: Rgb, back: Rgb },
    Image { pattern: Option<&'a str>, back: Rgb },
}

impl ColorMaskConfig {
    pub fn resolve(&self) -> ResolvedMask<'_> {
        let back = resolve_or(self.back_color.as_ref(), Rgb::WHITE);
        let start = |c: &Option<HexColor>| resolve_or(c.as_ref(), Rgb::BLACK);
        let end = |c: &Option<HexColor>| resolve_or(c.as_ref(), Rgb::BLUE);
        match self.kind {
            ColorMaskType::Solid => ResolvedMask::Solid { front: start(&self.front_color), back },
            ColorMaskType::RadialGradient => ResolvedMask::RadialGradient {
                center: start(&self.center_color),
                edge: end(&self.edge_color),
                back,
            },
            ColorMaskType::SquareGradient => ResolvedMask::SquareGradient {
                center: start(&self.center_color),
                edge: end(&self.edge_color),
                back,
            },
            ColorMaskType::HorizontalGradient => ResolvedMask::HorizontalGradient {
                left: start(&self.left_color),
                right: end(&self.right_color),
                back,
            },
            ColorMaskType::VerticalGradient => ResolvedMask::VerticalGradient {
                top: start(&self.top_color),
                bottom: end(&self.bottom_color),
                back,
            },
            ColorMaskType::Image => ResolvedMask::Image {
                pattern: self.color_mask_image.as_deref(),
                back,
            },
        }
    }
}

/// Build the mask strategy for styled rendering; black on white when unset
pub fn build_color_mask(config: Option<&ColorMaskConfig>) -> Result<Box<dyn ColorMask>, ServiceError> {
    let Some(config) = config else {
        return Ok(Box::new(SolidMask { front: Rgb::BLACK, back: Rgb::WHITE }));
    };

    let mask: Box<dyn ColorMask> = match config.resolve() {
        ResolvedMask::Solid { front, back } => Box::new(SolidMask { front, back }),
        ResolvedMask::RadialGradient { center, edge, back } => Box::new(GradientMask {
            shape: GradientShape::Radial,
            start: center,
            end: edge,
            back,
        }),
        ResolvedMask::SquareGradient { center, edge, back } => Box::new(GradientMask {
            shape: GradientShape::Square,
            start: center,
            end: edge,
            back,
        }),
        ResolvedMask::HorizontalGradient { left, right, back } => Box::new(GradientMask {
            shape: GradientShape::Horizontal,
            start: left,
            end: right,
            back,
        }),
        ResolvedMask::VerticalGradient { top, bottom, back } => Box::new(GradientMask {
            shape: GradientShape::Vertical,
            start: top,
            end: bottom,
            back,
        }),
        ResolvedMask::Image { pattern, back } => Box::new(ImageMask::decode(pattern, back)?),
    };
    Ok(mask)
}

#[derive(Debug, Clone, Copy)]
pub struct SolidMask {
    pub front: Rgb,
    pub back: Rgb,
}

impl ColorMask for SolidMask {
    fn name(&self) -> &'static str { "solid" }

    fn back_color(&self) -> Rgb {
        self.back
    }

    fn fore_color(&self, _x: u32, _y: u32, _width: u32, _height: u32) -> Rgb {
        self.front
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientShape {
    Radial,
    Square,
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
pub struct GradientMask {
    pub shape: GradientShape,
    pub start: Rgb,
    pub end: Rgb,
    pub back: Rgb,
}

impl GradientMask {
    /// Position along the gradient, 0 at `start` and 1 at `end`
    fn position(&self, x: u32, y: u32, width: u32, height: u32) -> f64 {
        let (x, y) = (f64::from(x), f64::from(y));
        let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
        let (cx, cy) = (w / 2.0, h / 2.0);
        match self.shape {
            GradientShape::Radial => ((x - cx).hypot(y - cy)) / (std::f64::consts::SQRT_2 * cx),
            GradientShape::Square => (x - cx).abs().max((y - cy).abs()) / cx,
            GradientShape::Horizontal => x / w,
            GradientShape::Vertical => y / h,
        }
    }
}

impl ColorMask for GradientMask {
    fn name(&self) -> &'static str {
        match self.shape {
            GradientShape::Radial => "radial_gradient",
            GradientShape::Square => "square_gradient",
            GradientShape::Horizontal => "horizontal_gradient",
            GradientShape::Vertical => "vertical_gradient",
        }
    }

    fn back_color(&self) -> Rgb {
        self.back
    }

    fn fore_color(&self, x: u32, y: u32, width: u32, height: u32) -> Rgb {
        self.start.lerp(self.end, self.position(x, y, width, height))
    }
}

/// Foreground sampled from a pattern image stretched over the canvas
#[derive(Debug, Clone)]
pub struct ImageMask {
    pattern: RgbImage,
    back: Rgb,
}

impl ImageMask {
    /// Black is rejected before the pattern is even looked at
    pub fn decode(pattern: Option<&str>, back: Rgb) -> Result<Self, ServiceError> {
        if back.is_black() {
            return Err(ServiceError::InvalidColorCombination);
        }
        let pattern = pattern.ok_or_else(|| {
            ServiceError::InvalidColorMaskImage("color_mask_image is required for image masks".to_string())
        })?;
        let bytes = encoding::decode_payload(pattern)
            .map_err(|e| ServiceError::InvalidColorMaskImage(e.to_string()))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| ServiceError::InvalidColorMaskImage(e.to_string()))?;
        Ok(Self::new(image, back))
    }

    pub fn new(pattern: DynamicImage, back: Rgb) -> Self {
        Self {
            pattern: pattern.to_rgb8(),
            back,
        }
    }
}

impl ColorMask for ImageMask {
    fn name(&self) -> &'static str { "image" }

    fn back_color(&self) -> Rgb {
        self.back
    }

    fn fore_color(&self, x: u32, y: u32, width: u32, height: u32) -> Rgb {
        let (pw, ph) = self.pattern.dimensions();
        let px = (u64::from(x) * u64::from(pw) / u64::from(width.max(1))) as u32;
        let py = (u64::from(y) * u64::from(ph) / u64::from(height.max(1))) as u32;
        Rgb(self.pattern.get_pixel(px.min(pw - 1), py.min(ph - 1)).0)
    }

    fn paint(&self, coverage: &GrayImage) -> RgbImage {
        let (width, height) = coverage.dimensions();
        let stretched = image::imageops::resize(&self.pattern, width, height, FilterType::CatmullRom);
        RgbImage::from_fn(width, height, |x, y| {
            let c = coverage.get_pixel(x, y).0[0];
            blend(self.back, c, || Rgb(stretched.get_pixel(x, y).0))
        })
    }
}
