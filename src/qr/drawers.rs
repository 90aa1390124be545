//! Module and Eye Drawers
//!
//! A drawer decides which points of a module cell are painted. Cell-local
//! coordinates run from (0, 0) at the top-left corner to (1, 1).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

const DEFAULT_GAPPED_RATIO: f64 = 0.8;
const DEFAULT_CIRCLE_RATIO: f64 = 1.0;
const DEFAULT_RADIUS_RATIO: f64 = 1.0;
const BAR_SHRINK: f64 = 0.8;

/// Which orthogonal neighbours of a module are dark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Neighbors {
    fn transposed(self) -> Self {
        Self {
            north: self.west,
            south: self.east,
            west: self.north,
            east: self.south,
        }
    }
}

/// Drawing strategy for one module cell
pub trait ModuleDrawer: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether cell-local point (u, v) is painted
    fn covers(&self, u: f64, v: f64, neighbors: Neighbors) -> bool;

    /// True when the whole cell is painted, letting the renderer skip sampling
    fn fills_cell(&self, _neighbors: Neighbors) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleDrawerType {
    #[default]
    Square,
    GappedSquare,
    Circle,
    Rounded,
    VerticalBars,
    HorizontalBars,
}

impl ModuleDrawerType {
    pub const ALL: [ModuleDrawerType; 6] = [
        Self::Square,
        Self::GappedSquare,
        Self::Circle,
        Self::Rounded,
        Self::VerticalBars,
        Self::HorizontalBars,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::GappedSquare => "gapped_square",
            Self::Circle => "circle",
            Self::Rounded => "rounded",
            Self::VerticalBars => "vertical_bars",
            Self::HorizontalBars => "horizontal_bars",
        }
    }

    pub fn supports_size_ratio(&self) -> bool {
        matches!(self, Self::GappedSquare | Self::Circle)
    }

    pub fn supports_radius_ratio(&self) -> bool {
        matches!(self, Self::Rounded)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeDrawerType {
    #[default]
    Square,
    Circle,
    Rounded,
}

impl From<EyeDrawerType> for ModuleDrawerType {
    fn from(kind: EyeDrawerType) -> Self {
        match kind {
            EyeDrawerType::Square => Self::Square,
            EyeDrawerType::Circle => Self::Circle,
            EyeDrawerType::Rounded => Self::Rounded,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDrawerConfig {
    #[serde(rename = "type", default)]
    pub kind: ModuleDrawerType,
    #[serde(default)]
    pub size_ratio: Option<f64>,
    #[serde(default)]
    pub radius_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EyeDrawerConfig {
    #[serde(rename = "type", default)]
    pub kind: EyeDrawerType,
    #[serde(default)]
    pub radius_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerRole {
    Module,
    Eye,
}

impl DrawerRole {
    fn name(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Eye => "eye",
        }
    }

    fn accepts(&self, kind: ModuleDrawerType) -> bool {
        match self {
            Self::Module => true,
            Self::Eye => matches!(
                kind,
                ModuleDrawerType::Square | ModuleDrawerType::Circle | ModuleDrawerType::Rounded
            ),
        }
    }
}

/// Map a drawer tag and its parameters to a strategy.
///
/// Parameters the chosen type does not use are ignored.
pub fn select_drawer(
    kind: ModuleDrawerType,
    size_ratio: Option<f64>,
    radius_ratio: Option<f64>,
    role: DrawerRole,
) -> Result<Box<dyn ModuleDrawer>, ServiceError> {
    if !role.accepts(kind) {
        return Err(ServiceError::UnsupportedDrawer {
            role: role.name(),
            kind: kind.name(),
        });
    }

    let drawer: Box<dyn ModuleDrawer> = match kind {
        ModuleDrawerType::Square => Box::new(SquareDrawer),
        ModuleDrawerType::GappedSquare => Box::new(GappedSquareDrawer {
            size_ratio: size_ratio.unwrap_or(DEFAULT_GAPPED_RATIO),
        }),
        ModuleDrawerType::Circle => Box::new(CircleDrawer {
            size_ratio: size_ratio.unwrap_or(DEFAULT_CIRCLE_RATIO),
        }),
        ModuleDrawerType::Rounded => Box::new(RoundedDrawer::new(
            radius_ratio.unwrap_or(DEFAULT_RADIUS_RATIO),
        )),
        ModuleDrawerType::VerticalBars => Box::new(VerticalBarsDrawer { shrink: BAR_SHRINK }),
        ModuleDrawerType::HorizontalBars => Box::new(HorizontalBarsDrawer {
            inner: VerticalBarsDrawer { shrink: BAR_SHRINK },
        }),
    };
    Ok(drawer)
}

/// Module drawer for styled rendering; square when unset
pub fn select_module_drawer(
    config: Option<&ModuleDrawerConfig>,
) -> Result<Box<dyn ModuleDrawer>, ServiceError> {
    let config = config.cloned().unwrap_or_default();
    select_drawer(config.kind, config.size_ratio, config.radius_ratio, DrawerRole::Module)
}

/// Eye drawer for styled rendering; square finders when unset, whatever the
/// module drawer is
pub fn select_eye_drawer(config: Option<&EyeDrawerConfig>) -> Result<Box<dyn ModuleDrawer>, ServiceError> {
    match config {
        Some(c) => select_drawer(c.kind.into(), None, c.radius_ratio, DrawerRole::Eye),
        None => Ok(Box::new(SquareDrawer)),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SquareDrawer;

impl ModuleDrawer for SquareDrawer {
    fn name(&self) -> &'static str { "square" }

    fn covers(&self, _u: f64, _v: f64, _neighbors: Neighbors) -> bool {
        true
    }

    fn fills_cell(&self, _neighbors: Neighbors) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GappedSquareDrawer {
    pub size_ratio: f64,
}

impl ModuleDrawer for GappedSquareDrawer {
    fn name(&self) -> &'static str { "gapped_square" }

    fn covers(&self, u: f64, v: f64, _neighbors: Neighbors) -> bool {
        let half = self.size_ratio / 2.0;
        (u - 0.5).abs() <= half && (v - 0.5).abs() <= half
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CircleDrawer {
    pub size_ratio: f64,
}

impl ModuleDrawer for CircleDrawer {
    fn name(&self) -> &'static str { "circle" }

    fn covers(&self, u: f64, v: f64, _neighbors: Neighbors) -> bool {
        let r = self.size_ratio / 2.0;
        (u - 0.5).powi(2) + (v - 0.5).powi(2) <= r * r
    }
}

/// Corners round off unless a dark neighbour touches either side of them
#[derive(Debug, Clone, Copy)]
pub struct RoundedDrawer {
    radius: f64,
}

impl RoundedDrawer {
    pub fn new(radius_ratio: f64) -> Self {
        Self {
            radius: radius_ratio.clamp(0.0, 1.0) / 2.0,
        }
    }
}

impl ModuleDrawer for RoundedDrawer {
    fn name(&self) -> &'static str { "rounded" }

    fn covers(&self, u: f64, v: f64, n: Neighbors) -> bool {
        let r = self.radius;
        if r <= 0.0 {
            return true;
        }
        let left = u < r;
        let right = u > 1.0 - r;
        let top = v < r;
        let bottom = v > 1.0 - r;

        let corner = match (left, right, top, bottom) {
            (true, _, true, _) if !(n.north || n.west) => Some((r, r)),
            (_, true, true, _) if !(n.north || n.east) => Some((1.0 - r, r)),
            (true, _, _, true) if !(n.south || n.west) => Some((r, 1.0 - r)),
            (_, true, _, true) if !(n.south || n.east) => Some((1.0 - r, 1.0 - r)),
            _ => None,
        };
        match corner {
            Some((cx, cy)) => (u - cx).powi(2) + (v - cy).powi(2) <= r * r,
            None => true,
        }
    }

    fn fills_cell(&self, n: Neighbors) -> bool {
        self.radius <= 0.0
            || ((n.north || n.west) && (n.north || n.east) && (n.south || n.west) && (n.south || n.east))
    }
}

/// Narrowed column; open ends become half-ellipses
#[derive(Debug, Clone, Copy)]
pub struct VerticalBarsDrawer {
    pub shrink: f64,
}

impl ModuleDrawer for VerticalBarsDrawer {
    fn name(&self) -> &'static str { "vertical_bars" }

    fn covers(&self, u: f64, v: f64, n: Neighbors) -> bool {
        let half = self.shrink / 2.0;
        let dx = u - 0.5;
        if dx.abs() > half {
            return false;
        }
        let open_end = if v < 0.5 { !n.north } else { !n.south };
        if !open_end {
            return true;
        }
        (dx / half).powi(2) + ((v - 0.5) / 0.5).powi(2) <= 1.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HorizontalBarsDrawer {
    inner: VerticalBarsDrawer,
}

impl ModuleDrawer for HorizontalBarsDrawer {
    fn name(&self) -> &'static str { "horizontal_bars" }

    fn covers(&self, u: f64, v: f64, n: Neighbors) -> bool {
        self.inner.covers(v, u, n.transposed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALONE: Neighbors = Neighbors { north: false, south: false, east: false, west: false };
    const SURROUNDED: Neighbors = Neighbors { north: true, south: true, east: true, west: true };

    fn drawer(kind: ModuleDrawerType) -> Box<dyn ModuleDrawer> {
        select_drawer(kind, None, None, DrawerRole::Module).unwrap()
    }

    #[test]
    fn test_every_type_selectable() {
        for kind in ModuleDrawerType::ALL {
            assert_eq!(drawer(kind).name(), kind.name());
        }
    }

    #[test]
    fn test_default_module_drawer_is_square() {
        assert_eq!(select_module_drawer(None).unwrap().name(), "square");
    }

    #[test]
    fn test_eye_drawer_defaults_to_square() {
        assert_eq!(select_eye_drawer(None).unwrap().name(), "square");
        let eye = EyeDrawerConfig { kind: EyeDrawerType::Rounded, radius_ratio: Some(0.5) };
        assert_eq!(select_eye_drawer(Some(&eye)).unwrap().name(), "rounded");
    }

    #[test]
    fn test_bars_rejected_for_eyes() {
        let err = select_drawer(ModuleDrawerType::VerticalBars, None, None, DrawerRole::Eye).unwrap_err();
        assert_eq!(err.code(), "unsupported_drawer");
    }

    #[test]
    fn test_irrelevant_parameter_ignored() {
        let config = ModuleDrawerConfig {
            kind: ModuleDrawerType::Square,
            size_ratio: Some(0.2),
            radius_ratio: Some(0.9),
        };
        let d = select_module_drawer(Some(&config)).unwrap();
        assert!(d.covers(0.01, 0.01, ALONE));
    }

    #[test]
    fn test_gapped_square_leaves_margin() {
        let d = select_drawer(ModuleDrawerType::GappedSquare, Some(0.5), None, DrawerRole::Module).unwrap();
        assert!(d.covers(0.5, 0.5, ALONE));
        assert!(!d.covers(0.2, 0.5, ALONE));
    }

    #[test]
    fn test_circle_excludes_corners() {
        let d = drawer(ModuleDrawerType::Circle);
        assert!(d.covers(0.5, 0.5, ALONE));
        assert!(!d.covers(0.02, 0.02, ALONE));
    }

    #[test]
    fn test_rounded_corners_depend_on_neighbors() {
        let d = drawer(ModuleDrawerType::Rounded);
        assert!(!d.covers(0.02, 0.02, ALONE));
        assert!(d.covers(0.02, 0.02, SURROUNDED));
        assert!(d.fills_cell(SURROUNDED));
        let west_only = Neighbors { west: true, ..ALONE };
        assert!(d.covers(0.02, 0.02, west_only));
        assert!(!d.covers(0.98, 0.02, west_only));
    }

    #[test]
    fn test_vertical_bars_join_vertically() {
        let d = drawer(ModuleDrawerType::VerticalBars);
        assert!(!d.covers(0.05, 0.5, SURROUNDED));
        assert!(d.covers(0.15, 0.01, Neighbors { north: true, ..ALONE }));
        assert!(!d.covers(0.15, 0.01, ALONE));
    }

    #[test]
    fn test_horizontal_bars_are_transposed() {
        let d = drawer(ModuleDrawerType::HorizontalBars);
        assert!(!d.covers(0.5, 0.05, SURROUNDED));
        assert!(d.covers(0.01, 0.15, Neighbors { west: true, ..ALONE }));
    }
}
