//! Parameter types for pixel transforms.
//!
//! These describe *what* to do; [`resize`](super::resize) and
//! [`geometry`](super::geometry) do the pixel work. They are also what the
//! config file and the CLI deserialize into, so each one knows its external
//! spelling.
//!
//! ## Types
//!
//! - [`ResizeQuality`]: `fast` (nearest neighbor) or `high` (progressive bilinear).
//! - [`Margins`]: per-side crop amounts, in pixels or percent depending on the call.
//! - [`Rotation`]: a clockwise quarter, half or three-quarter turn.

use super::error::{Result, TransformError};
use serde::{Deserialize, Serialize};

/// Resize algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResizeQuality {
    /// Nearest neighbor, single pass. Blocky when enlarging.
    Fast,
    /// Repeated halving/doubling with bilinear sampling.
    #[default]
    #[serde(rename = "high")]
    #[value(name = "high")]
    HighQuality,
}

/// Amount to remove from each side of an image.
///
/// Signed so that raw user input reaches validation intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Margins {
    /// CSS order: top, right, bottom, left.
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    fn any_negative(&self) -> bool {
        self.top < 0 || self.right < 0 || self.bottom < 0 || self.left < 0
    }

    /// Combined vertical margin, widened so it cannot overflow.
    pub fn vertical(&self) -> i64 {
        self.top as i64 + self.bottom as i64
    }

    /// Combined horizontal margin, widened so it cannot overflow.
    pub fn horizontal(&self) -> i64 {
        self.right as i64 + self.left as i64
    }

    /// Check pixel margins against a `width x height` image.
    pub fn validate_pixels(&self, width: u32, height: u32) -> Result<()> {
        if self.any_negative() {
            return Err(TransformError::invalid(format!(
                "Crop margins cannot be less than 0 - got top {}, right {}, bottom {}, left {}.",
                self.top, self.right, self.bottom, self.left
            )));
        }
        if self.vertical() > height as i64 {
            return Err(TransformError::invalid(format!(
                "Cannot crop image by more than its total height ({height}) - invalid top and bottom parameters: {}, {}",
                self.top, self.bottom
            )));
        }
        if self.horizontal() > width as i64 {
            return Err(TransformError::invalid(format!(
                "Cannot crop image by more than its total width ({width}) - invalid right and left parameters: {}, {}",
                self.right, self.left
            )));
        }
        Ok(())
    }

    /// Check percentage margins: each in `0..=100`, opposite sides at most 100 combined.
    pub fn validate_percentages(&self) -> Result<()> {
        let sides = [self.top, self.right, self.bottom, self.left];
        if sides.iter().any(|p| !(0..=100).contains(p)) {
            return Err(TransformError::invalid(format!(
                "Crop percentages must be between 0 and 100 - got top {}, right {}, bottom {}, left {}.",
                self.top, self.right, self.bottom, self.left
            )));
        }
        if self.vertical() > 100 {
            return Err(TransformError::invalid(format!(
                "Cannot crop image by more than 100% - invalid top and bottom parameters: {}, {}",
                self.top, self.bottom
            )));
        }
        if self.horizontal() > 100 {
            return Err(TransformError::invalid(format!(
                "Cannot crop image by more than 100% - invalid right and left parameters: {}, {}",
                self.right, self.left
            )));
        }
        Ok(())
    }
}

/// Clockwise rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// 90 degrees.
    Quarter,
    /// 180 degrees.
    Half,
    /// 270 degrees.
    ThreeQuarters,
}

impl Rotation {
    /// Accepts 90, 180 and 270, plus their equivalents modulo 360 (e.g. -90).
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            90 => Ok(Self::Quarter),
            180 => Ok(Self::Half),
            270 => Ok(Self::ThreeQuarters),
            _ => Err(TransformError::invalid(format!(
                "Rotation must be a non-zero multiple of 90 degrees - got {degrees}"
            ))),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarters => 270,
        }
    }
}
