//! Shared test utilities for the pixmend test suite.
//!
//! Builders for small synthetic buffers and files, plus assertions that
//! report the first differing pixel instead of dumping two whole buffers.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = gradient_buffer(8, 6);
//! let out = flip_horizontally(&src);
//! assert_same_pixels(&flip_horizontally(&out), &src);
//! ```

use std::path::Path;

use crate::imaging::{Color, PixelBuffer, Transparency};

// =========================================================================
// Buffer builders
// =========================================================================

/// Every pixel set to `color`.
pub fn solid_buffer(width: u32, height: u32, color: Color, transparency: Transparency) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, transparency, |_, _| color)
}

/// Translucent buffer where every pixel is distinct up to 256 columns/rows:
/// red follows x, green follows y, blue mixes both, alpha varies too.
pub fn gradient_buffer(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, Transparency::Translucent, |x, y| {
        Color::rgba(
            (x % 256) as u8,
            (y % 256) as u8,
            ((x * 7 + y * 13) % 256) as u8,
            (255 - (x + y) % 128) as u8,
        )
    })
}

/// Opaque variant of [`gradient_buffer`].
pub fn opaque_gradient_buffer(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, Transparency::Opaque, |x, y| {
        Color::rgb((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8)
    })
}

// =========================================================================
// File fixtures
// =========================================================================

/// Write an opaque RGB PNG with a simple gradient.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Write an RGBA PNG with a transparent left half.
pub fn write_translucent_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, _| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        image::Rgba([200, 100, 50, alpha])
    });
    img.save(path).unwrap();
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert two buffers have the same dimensions and pixels, naming the first
/// differing coordinate on failure.
pub fn assert_same_pixels(actual: &PixelBuffer, expected: &PixelBuffer) {
    assert_eq!(
        actual.dimensions(),
        expected.dimensions(),
        "dimensions differ"
    );
    if let Some((x, y, c)) = actual
        .enumerate_colors()
        .find(|&(x, y, c)| c != expected.pixel(x, y))
    {
        panic!(
            "pixel ({x}, {y}) differs: got {c}, expected {}",
            expected.pixel(x, y)
        );
    }
}
