//! Geometric transforms: flips, quarter-turn rotations and crops.
//!
//! Each transform is a pure coordinate remap: the output buffer is allocated
//! at its final size and every output pixel `(x, y)` reads one source pixel.
//!
//! | Transform | Output size | Source of output `(x, y)` |
//! |---|---|---|
//! | flip horizontal | `w x h` | `(w-1-x, y)` |
//! | flip vertical | `w x h` | `(x, h-1-y)` |
//! | rotate 90° | `h x w` | `(y, h-1-x)` |
//! | rotate 180° | `w x h` | `(w-1-x, h-1-y)` |
//! | rotate 270° | `h x w` | `(w-1-y, x)` |
//! | crop | `(w-l-r) x (h-t-b)` | `(x+l, y+t)` |
//!
//! `w` and `h` are the source dimensions. Rotations are clockwise.

use super::buffer::PixelBuffer;
use super::calculations::percent_of;
use super::error::Result;
use super::params::{Margins, Rotation};
use std::borrow::Cow;

/// Mirror along either or both axes. With neither flag set the input is
/// returned as is.
pub fn flip(buffer: &PixelBuffer, horizontal: bool, vertical: bool) -> Cow<'_, PixelBuffer> {
    if !horizontal && !vertical {
        return Cow::Borrowed(buffer);
    }
    let (width, height) = buffer.dimensions();
    Cow::Owned(PixelBuffer::from_fn(
        width,
        height,
        buffer.transparency(),
        |x, y| {
            let sx = if horizontal { width - 1 - x } else { x };
            let sy = if vertical { height - 1 - y } else { y };
            buffer.pixel(sx, sy)
        },
    ))
}

pub fn flip_horizontally(buffer: &PixelBuffer) -> PixelBuffer {
    flip(buffer, true, false).into_owned()
}

pub fn flip_vertically(buffer: &PixelBuffer) -> PixelBuffer {
    flip(buffer, false, true).into_owned()
}

/// Quarter turn clockwise. Width and height swap.
pub fn rotate_by_90_degrees(buffer: &PixelBuffer) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    PixelBuffer::from_fn(height, width, buffer.transparency(), |x, y| {
        buffer.pixel(y, height - 1 - x)
    })
}

/// Half turn; the same as flipping along both axes.
pub fn rotate_by_180_degrees(buffer: &PixelBuffer) -> PixelBuffer {
    flip(buffer, true, true).into_owned()
}

/// Three quarter turns clockwise (one counter-clockwise). Width and height swap.
pub fn rotate_by_270_degrees(buffer: &PixelBuffer) -> PixelBuffer {
    let (width, height) = buffer.dimensions();
    PixelBuffer::from_fn(height, width, buffer.transparency(), |x, y| {
        buffer.pixel(width - 1 - y, x)
    })
}

pub fn rotate(buffer: &PixelBuffer, rotation: Rotation) -> PixelBuffer {
    match rotation {
        Rotation::Quarter => rotate_by_90_degrees(buffer),
        Rotation::Half => rotate_by_180_degrees(buffer),
        Rotation::ThreeQuarters => rotate_by_270_degrees(buffer),
    }
}

/// Remove `top`, `right`, `bottom` and `left` pixels from the sides.
///
/// # Errors
/// `InvalidArgument` when a margin is negative, when `top + bottom` exceeds
/// the height, or when `right + left` exceeds the width.
pub fn crop(buffer: &PixelBuffer, top: i32, right: i32, bottom: i32, left: i32) -> Result<PixelBuffer> {
    crop_margins(buffer, &Margins::new(top, right, bottom, left))
}

/// [`crop`] taking a [`Margins`] value.
pub fn crop_margins(buffer: &PixelBuffer, margins: &Margins) -> Result<PixelBuffer> {
    let (width, height) = buffer.dimensions();
    margins.validate_pixels(width, height)?;

    // Validation guarantees these are non-negative and fit the image.
    let (top, left) = (margins.top as u32, margins.left as u32);
    let new_width = width - margins.horizontal() as u32;
    let new_height = height - margins.vertical() as u32;

    Ok(PixelBuffer::from_fn(
        new_width,
        new_height,
        buffer.transparency(),
        |x, y| buffer.pixel(x + left, y + top),
    ))
}

/// Crop by percentages (0–100) of the matching dimension.
///
/// Each percentage becomes a pixel margin rounded half away from zero, then
/// [`crop`] does the rest. Opposite sides may not add up to more than 100.
pub fn crop_by_percentage(
    buffer: &PixelBuffer,
    top: i32,
    right: i32,
    bottom: i32,
    left: i32,
) -> Result<PixelBuffer> {
    crop_by_percentage_margins(buffer, &Margins::new(top, right, bottom, left))
}

/// [`crop_by_percentage`] taking a [`Margins`] value.
pub fn crop_by_percentage_margins(buffer: &PixelBuffer, percentages: &Margins) -> Result<PixelBuffer> {
    percentages.validate_percentages()?;
    let (width, height) = buffer.dimensions();
    let pixels = Margins::new(
        percent_of(height, percentages.top),
        percent_of(width, percentages.right),
        percent_of(height, percentages.bottom),
        percent_of(width, percentages.left),
    );
    crop_margins(buffer, &pixels)
}
