//! Color algebra over 8-bit RGBA.
//!
//! Two layers live here:
//!
//! - **Per color**: [`Color`] methods plus the `Option`-taking free functions
//!   ([`inverted`], [`grayscale`], [`semi_transparent`],
//!   [`is_color_within_range`]). An absent color is not an error: it comes
//!   back absent (or `false` for the range check).
//! - **Per buffer**: [`invert_colors`], [`convert_to_grayscale`] and
//!   [`replace_color`] map every pixel of a copy of the source through the
//!   per-color functions.
//!
//! Range checks compare red, green and blue only. Alpha never takes part in
//! matching; replacement keeps the alpha of the pixel being replaced.

use super::buffer::PixelBuffer;
use super::error::{Result, TransformError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise `255 - c` for red, green and blue. Alpha is kept.
    pub fn inverted(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
            a: self.a,
        }
    }

    /// Replace red, green and blue with their truncated mean. Alpha is kept.
    pub fn grayscale(self) -> Self {
        let mean = ((self.r as u16 + self.g as u16 + self.b as u16) / 3) as u8;
        Self {
            r: mean,
            g: mean,
            b: mean,
            a: self.a,
        }
    }

    /// `[r, g, b, a]`.
    pub fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, alpha: u8) -> Self {
        Self { a: alpha, ..self }
    }

    /// Same color with a different alpha, validated to lie in `0..=255`.
    pub fn semi_transparent(self, alpha: i32) -> Result<Self> {
        let alpha = channel_value(alpha).ok_or_else(|| {
            TransformError::invalid(format!("Alpha value: {alpha} - out of range (0-255)."))
        })?;
        Ok(self.with_alpha(alpha))
    }

    /// Whether every RGB channel of `self` and `other` differs by at most `threshold`.
    pub fn is_within_range(&self, other: &Color, threshold: i32) -> Result<bool> {
        let threshold = validate_threshold(threshold)?;
        Ok(self.within(other, threshold))
    }

    /// Range check with an already-validated threshold.
    fn within(&self, other: &Color, threshold: u8) -> bool {
        self.r.abs_diff(other.r) <= threshold
            && self.g.abs_diff(other.g) <= threshold
            && self.b.abs_diff(other.b) <= threshold
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(pixel: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self { r, g, b, a }
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba([color.r, color.g, color.b, color.a])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = TransformError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Parses `#rrggbb`, `#rrggbbaa`, `r,g,b` or `r,g,b,a`. Missing alpha means opaque.
impl FromStr for Color {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || TransformError::invalid(format!("Invalid color: {s:?}"));

        if let Some(hex) = s.strip_prefix('#') {
            if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            let a = if hex.len() == 8 { channel(6)? } else { 255 };
            return Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a));
        }

        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<Vec<u8>>>()?;
        match parts.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            _ => Err(invalid()),
        }
    }
}

fn channel_value(value: i32) -> Option<u8> {
    u8::try_from(value).ok()
}

/// Checks a tolerance threshold lies in `0..=255`.
pub(crate) fn validate_threshold(threshold: i32) -> Result<u8> {
    channel_value(threshold).ok_or_else(|| {
        TransformError::invalid(format!("Threshold: {threshold} - out of range (0-255)."))
    })
}

// ============================================================================
// Per-color operations with absent-input propagation
// ============================================================================

/// `false` when either color is absent; otherwise [`Color::is_within_range`].
///
/// The absent check runs before threshold validation, so an absent color with
/// an out-of-range threshold is still `Ok(false)`.
pub fn is_color_within_range(
    first: Option<Color>,
    second: Option<Color>,
    threshold: i32,
) -> Result<bool> {
    match (first, second) {
        (Some(a), Some(b)) => a.is_within_range(&b, threshold),
        _ => Ok(false),
    }
}

pub fn inverted(color: Option<Color>) -> Option<Color> {
    color.map(Color::inverted)
}

pub fn grayscale(color: Option<Color>) -> Option<Color> {
    color.map(Color::grayscale)
}

/// Absent stays absent without validating `alpha`.
pub fn semi_transparent(color: Option<Color>, alpha: i32) -> Result<Option<Color>> {
    color.map(|c| c.semi_transparent(alpha)).transpose()
}

// ============================================================================
// Whole-buffer operations
// ============================================================================

/// Copy of `buffer` with every pixel inverted.
pub fn invert_colors(buffer: &PixelBuffer) -> PixelBuffer {
    map_copy(buffer, Color::inverted)
}

/// Copy of `buffer` with every pixel reduced to its channel mean.
pub fn convert_to_grayscale(buffer: &PixelBuffer) -> PixelBuffer {
    map_copy(buffer, Color::grayscale)
}

/// Copy of `buffer` where every pixel within `threshold` of `original`
/// becomes `replacement`, keeping the replaced pixel's own alpha.
///
/// The threshold is validated before anything is allocated.
pub fn replace_color(
    buffer: &PixelBuffer,
    original: Color,
    replacement: Color,
    threshold: i32,
) -> Result<PixelBuffer> {
    let threshold = validate_threshold(threshold)?;
    Ok(swap_matching(buffer, original, replacement, threshold))
}

/// [`replace_color`] with a threshold of zero: only exact RGB matches change.
pub fn replace_exact_color(buffer: &PixelBuffer, original: Color, replacement: Color) -> PixelBuffer {
    swap_matching(buffer, original, replacement, 0)
}

/// `threshold` must already be validated.
fn swap_matching(buffer: &PixelBuffer, original: Color, replacement: Color, threshold: u8) -> PixelBuffer {
    map_copy(buffer, |pixel| {
        if pixel.within(&original, threshold) {
            replacement.with_alpha(pixel.a)
        } else {
            pixel
        }
    })
}

/// Deep copy, then repaint every pixel of the copy from its own current value.
fn map_copy(buffer: &PixelBuffer, f: impl Fn(Color) -> Color) -> PixelBuffer {
    let mut copy = buffer.clone();
    let source = buffer;
    copy.for_each_pixel(|x, y| f(source.pixel(x, y)));
    copy
}
