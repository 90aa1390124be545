//! Symbol Construction
//!
//! Wraps the `qrcode` encoder and exposes the module grid with the
//! neighbourhood queries the drawers need.

use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::qr::drawers::Neighbors;

pub const MIN_VERSION: i16 = 1;
pub const MAX_VERSION: i16 = 40;

/// Side of a finder pattern in modules
const EYE_SIZE: i32 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub const ALL: [ErrorCorrection; 4] = [Self::L, Self::M, Self::Q, Self::H];

    pub fn letter(&self) -> char {
        match self {
            Self::L => 'L',
            Self::M => 'M',
            Self::Q => 'Q',
            Self::H => 'H',
        }
    }

    /// Approximate share of damaged codewords that can be recovered
    pub fn recovery_percent(&self) -> u8 {
        match self {
            Self::L => 7,
            Self::M => 15,
            Self::Q => 25,
            Self::H => 30,
        }
    }

    fn ec_level(&self) -> EcLevel {
        match self {
            Self::L => EcLevel::L,
            Self::M => EcLevel::M,
            Self::Q => EcLevel::Q,
            Self::H => EcLevel::H,
        }
    }
}

/// Dark/light module grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    version: i16,
    width: usize,
    modules: Vec<bool>,
}

impl SymbolMatrix {
    /// Encode `data` at the smallest version that fits, starting at `min_version`
    pub fn build(
        data: &str,
        min_version: Option<i16>,
        error_correction: ErrorCorrection,
    ) -> Result<Self, ServiceError> {
        let level = error_correction.ec_level();
        let too_long = || ServiceError::DataTooLong {
            level: error_correction.letter(),
            length: data.chars().count(),
        };

        let code = match min_version {
            None => QrCode::with_error_correction_level(data.as_bytes(), level),
            Some(start) => {
                let mut attempt = Err(QrError::DataTooLong);
                for version in start.max(MIN_VERSION)..=MAX_VERSION {
                    attempt = QrCode::with_version(data.as_bytes(), Version::Normal(version), level);
                    if !matches!(attempt, Err(QrError::DataTooLong)) {
                        break;
                    }
                }
                attempt
            }
        };

        let code = code.map_err(|e| match e {
            QrError::DataTooLong => too_long(),
            other => ServiceError::internal(format!("QR encoding failed: {other}")),
        })?;
        Ok(Self::from_code(&code))
    }

    fn from_code(code: &QrCode) -> Self {
        let version = match code.version() {
            Version::Normal(v) | Version::Micro(v) => v,
        };
        Self {
            version,
            width: code.width(),
            modules: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
        }
    }

    /// Build from rows of `#` (dark) and `.` (light); rows must share one width
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let width = rows.len();
        let modules = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();
        Self { version: 0, width, modules }
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    /// Modules per side, quiet zone excluded
    pub fn width(&self) -> usize {
        self.width
    }

    /// Out-of-range coordinates are light (quiet zone)
    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        let w = self.width as i32;
        if x < 0 || y < 0 || x >= w || y >= w {
            return false;
        }
        self.modules[(y * w + x) as usize]
    }

    /// Whether (x, y) lies in one of the three finder patterns
    pub fn is_eye(&self, x: i32, y: i32) -> bool {
        let far = self.width as i32 - EYE_SIZE;
        let near_x = x < EYE_SIZE;
        let near_y = y < EYE_SIZE;
        (near_x && near_y) || (x >= far && near_y) || (near_x && y >= far)
    }

    pub fn neighbors(&self, x: i32, y: i32) -> Neighbors {
        Neighbors {
            north: self.is_dark(x, y - 1),
            south: self.is_dark(x, y + 1),
            west: self.is_dark(x - 1, y),
            east: self.is_dark(x + 1, y),
        }
    }

    #[cfg(test)]
    fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}
