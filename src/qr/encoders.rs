//! Output encoders
//!
//! Text and vector encoders serialize straight from the [`SymbolMatrix`];
//! raster encoders paint an RGB canvas of `(modules + 2 * border) * box_size`
//! pixels per side.

use std::fmt::Write as _;
use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, RgbImage};

use crate::color::Rgb;
use crate::error::ServiceError;
use crate::qr::drawers::ModuleDrawer;
use crate::qr::masks::ColorMask;
use crate::qr::matrix::SymbolMatrix;

/// Sub-samples per pixel axis when a drawer only partly covers a cell
const SUPERSAMPLE: u32 = 4;

/// Blank, upper half, lower half, full block
const HALF_BLOCKS: [char; 4] = ['\u{a0}', '\u{2580}', '\u{2584}', '\u{2588}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvgVariant {
    /// Standalone document, one rect per module on a filled background
    Full,
    /// Standalone document, all modules merged into one path
    Path,
    /// Bare `<svg>` element for inlining
    Fragment,
}

fn canvas_modules(matrix: &SymbolMatrix, border: u32) -> u32 {
    matrix.width() as u32 + 2 * border
}

fn dark_modules(matrix: &SymbolMatrix) -> impl Iterator<Item = (i32, i32)> + '_ {
    let w = matrix.width() as i32;
    (0..w)
        .flat_map(move |y| (0..w).map(move |x| (x, y)))
        .filter(move |&(x, y)| matrix.is_dark(x, y))
}

fn hex(c: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", c.0[0], c.0[1], c.0[2])
}

/// Half-block text art, two module rows per line, quiet zone included
pub fn render_ascii(matrix: &SymbolMatrix, border: u32) -> String {
    let b = border as i32;
    let w = matrix.width() as i32;
    let mut out = String::new();
    for y in (-b..w + b).step_by(2) {
        for x in -b..w + b {
            let top = matrix.is_dark(x, y) as usize;
            let bottom = matrix.is_dark(x, y + 1) as usize;
            out.push(HALF_BLOCKS[top | (bottom << 1)]);
        }
        out.push('\n');
    }
    out
}

pub fn render_svg(
    matrix: &SymbolMatrix,
    border: u32,
    box_size: u32,
    variant: SvgVariant,
    fill: Rgb,
    back: Rgb,
) -> String {
    let modules = canvas_modules(matrix, border);
    let mm = f64::from(modules * box_size) / 10.0;
    let b = border as i32;
    let dark = || dark_modules(matrix);

    let mut svg = String::new();
    if variant != SvgVariant::Fragment {
        svg += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    }
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" \
         width=\"{mm}mm\" height=\"{mm}mm\" viewBox=\"0 0 {modules} {modules}\" stroke=\"none\">"
    );

    match variant {
        SvgVariant::Full => {
            let _ = writeln!(svg, "\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>", hex(back));
            for (x, y) in dark() {
                let _ = writeln!(
                    svg,
                    "\t<rect x=\"{}\" y=\"{}\" width=\"1\" height=\"1\" fill=\"{}\"/>",
                    x + b,
                    y + b,
                    hex(fill)
                );
            }
        }
        SvgVariant::Path => {
            let _ = writeln!(svg, "\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>", hex(back));
            svg += "\t<path d=\"";
            for (i, (x, y)) in dark().enumerate() {
                if i > 0 {
                    svg.push(' ');
                }
                let _ = write!(svg, "M{},{}h1v1h-1z", x + b, y + b);
            }
            let _ = writeln!(svg, "\" fill=\"{}\"/>", hex(fill));
        }
        SvgVariant::Fragment => {
            for (x, y) in dark() {
                let _ = writeln!(
                    svg,
                    "\t<rect x=\"{}\" y=\"{}\" width=\"1\" height=\"1\"/>",
                    x + b,
                    y + b
                );
            }
        }
    }
    svg += "</svg>\n";
    svg
}

/// Flat two-color raster
pub fn render_basic(matrix: &SymbolMatrix, border: u32, box_size: u32, fill: Rgb, back: Rgb) -> RgbImage {
    let side = canvas_modules(matrix, border) * box_size;
    let mut img = RgbImage::from_pixel(side, side, back.into());
    let w = matrix.width() as i32;
    for y in 0..w {
        for x in 0..w {
            if !matrix.is_dark(x, y) {
                continue;
            }
            let (x0, y0) = ((x as u32 + border) * box_size, (y as u32 + border) * box_size);
            for py in y0..y0 + box_size {
                for px in x0..x0 + box_size {
                    img.put_pixel(px, py, fill.into());
                }
            }
        }
    }
    img
}

/// Center of sub-sample `i` within its pixel
fn sub_offset(i: u32) -> f64 {
    (f64::from(i) + 0.5) / f64::from(SUPERSAMPLE)
}

/// Anti-aliased module coverage, 0 = background and 255 = fully painted.
///
/// Finder-pattern modules use `eye_drawer`, every other module `module_drawer`.
fn coverage_map(
    matrix: &SymbolMatrix,
    border: u32,
    box_size: u32,
    module_drawer: &dyn ModuleDrawer,
    eye_drawer: &dyn ModuleDrawer,
) -> GrayImage {
    let side = canvas_modules(matrix, border) * box_size;
    let mut coverage = GrayImage::new(side, side);
    let samples = SUPERSAMPLE * SUPERSAMPLE;
    let cell = f64::from(box_size);
    let w = matrix.width() as i32;

    for y in 0..w {
        for x in 0..w {
            if !matrix.is_dark(x, y) {
                continue;
            }
            let drawer = if matrix.is_eye(x, y) { eye_drawer } else { module_drawer };
            let neighbors = matrix.neighbors(x, y);
            let solid = drawer.fills_cell(neighbors);
            let (x0, y0) = ((x as u32 + border) * box_size, (y as u32 + border) * box_size);

            for py in 0..box_size {
                for px in 0..box_size {
                    let value = if solid {
                        255
                    } else {
                        let mut hits = 0;
                        for sy in 0..SUPERSAMPLE {
                            for sx in 0..SUPERSAMPLE {
                                let u = (f64::from(px) + sub_offset(sx)) / cell;
                                let v = (f64::from(py) + sub_offset(sy)) / cell;
                                if drawer.covers(u, v, neighbors) {
                                    hits += 1;
                                }
                            }
                        }
                        (hits * 255 / samples) as u8
                    };
                    coverage.put_pixel(x0 + px, y0 + py, Luma([value]));
                }
            }
        }
    }
    coverage
}

/// Alpha-composite `logo`, scaled to a quarter of the canvas edge, at the center
fn composite_logo(canvas: &mut RgbImage, logo: &DynamicImage) {
    let edge = canvas.width() / 4;
    if edge == 0 {
        return;
    }
    let logo = logo.resize_exact(edge, edge, FilterType::Lanczos3).to_rgba8();
    let offset_x = (canvas.width() - edge) / 2;
    let offset_y = (canvas.height() - edge) / 2;
    for (x, y, px) in logo.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let base = canvas.get_pixel_mut(offset_x + x, offset_y + y);
        let blended = Rgb(base.0).lerp(Rgb([r, g, b]), f64::from(a) / 255.0);
        *base = blended.into();
    }
}

pub fn render_styled(
    matrix: &SymbolMatrix,
    border: u32,
    box_size: u32,
    module_drawer: &dyn ModuleDrawer,
    eye_drawer: &dyn ModuleDrawer,
    mask: &dyn ColorMask,
    logo: Option<&DynamicImage>,
) -> RgbImage {
    let coverage = coverage_map(matrix, border, box_size, module_drawer, eye_drawer);
    let mut canvas = mask.paint(&coverage);
    if let Some(logo) = logo {
        composite_logo(&mut canvas, logo);
    }
    canvas
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ServiceError::internal(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
