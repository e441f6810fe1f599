//! The owned pixel grid every transform reads from and writes to.
//!
//! [`PixelBuffer`] wraps an [`image::RgbaImage`], so storage is one contiguous
//! row-major `Vec<u8>` with four bytes per pixel. Next to the pixels it records
//! a [`Transparency`] flag mirroring whether the image carries an alpha
//! channel at all:
//!
//! - [`Transparency::Opaque`] buffers never hold an alpha other than 255.
//!   Every write forces it, the same way writing into an RGB-only raster
//!   drops alpha.
//! - [`Transparency::Translucent`] buffers store alpha per pixel.
//!
//! Transforms never mutate their input. They allocate a fresh buffer and fill
//! it through [`PixelBuffer::for_each_pixel`] (or [`PixelBuffer::from_fn`],
//! which is the same thing on a new allocation).

use super::color::Color;
use super::error::{Result, TransformError};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Whether a buffer's alpha channel is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    /// Alpha is always 255.
    Opaque,
    /// Alpha varies per pixel.
    Translucent,
}

/// Integer region `(x, y, width, height)`.
///
/// Signed so that callers can hand in raw, unchecked values; anything that
/// addresses a buffer validates the region first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the region has non-negative size and lies inside `width x height`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let (x, y, w, h) = (
            self.x as i64,
            self.y as i64,
            self.width as i64,
            self.height as i64,
        );
        x >= 0 && y >= 0 && w >= 0 && h >= 0 && x + w <= width as i64 && y + h <= height as i64
    }
}

/// An owned width x height grid of 8-bit RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: RgbaImage,
    transparency: Transparency,
}

impl PixelBuffer {
    // -- Construction ---------------------------------------------------------

    /// A buffer filled with black (opaque black, or fully transparent black).
    pub fn new(width: u32, height: u32, transparency: Transparency) -> Self {
        let fill = match transparency {
            Transparency::Opaque => Color::BLACK,
            Transparency::Translucent => Color::TRANSPARENT,
        };
        Self {
            pixels: RgbaImage::from_pixel(width, height, fill.into()),
            transparency,
        }
    }

    /// Allocate a buffer and paint every coordinate with `f`.
    pub fn from_fn(
        width: u32,
        height: u32,
        transparency: Transparency,
        f: impl FnMut(u32, u32) -> Color,
    ) -> Self {
        let mut buffer = Self::new(width, height, transparency);
        buffer.for_each_pixel(f);
        buffer
    }

    /// Wrap decoded RGBA pixels. The buffer is [`Transparency::Opaque`] only if
    /// every pixel already has alpha 255.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let transparency = if pixels.pixels().all(|p| p.0[3] == 255) {
            Transparency::Opaque
        } else {
            Transparency::Translucent
        };
        Self {
            pixels,
            transparency,
        }
    }

    /// Wrap RGBA pixels with an explicit flag. Alpha is normalised to 255 for
    /// opaque buffers.
    pub fn with_transparency(mut pixels: RgbaImage, transparency: Transparency) -> Self {
        if transparency == Transparency::Opaque {
            for p in pixels.pixels_mut() {
                p.0[3] = 255;
            }
        }
        Self {
            pixels,
            transparency,
        }
    }

    /// Convert any decoded image. Color types without an alpha channel become
    /// opaque buffers, everything else translucent.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let transparency = if image.color().has_alpha() {
            Transparency::Translucent
        } else {
            Transparency::Opaque
        };
        Self::with_transparency(image.to_rgba8(), transparency)
    }

    /// RGB8 for opaque buffers, RGBA8 otherwise.
    pub fn to_dynamic(&self) -> DynamicImage {
        let rgba = DynamicImage::ImageRgba8(self.pixels.clone());
        match self.transparency {
            Transparency::Opaque => DynamicImage::ImageRgb8(rgba.to_rgb8()),
            Transparency::Translucent => rgba,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn transparency(&self) -> Transparency {
        self.transparency
    }

    /// True when the buffer has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether every stored alpha is 255, regardless of the flag.
    pub fn is_fully_opaque(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 255)
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Color at `(x, y)`.
    ///
    /// # Panics
    /// If the coordinate is outside the buffer. Use [`Self::get_pixel`] for a
    /// checked read.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        (*self.pixels.get_pixel(x, y)).into()
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixels.get_pixel_checked(x, y).map(|p| (*p).into())
    }

    /// Write one pixel. Opaque buffers drop the alpha of `color`.
    ///
    /// # Panics
    /// If the coordinate is outside the buffer.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        let color = self.admit(color);
        self.pixels.put_pixel(x, y, color.into());
    }

    /// All colors in row-major order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.pixels.pixels().map(|p| (*p).into())
    }

    /// `(x, y, color)` for every pixel in row-major order.
    pub fn enumerate_colors(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        self.pixels
            .enumerate_pixels()
            .map(|(x, y, p)| (x, y, (*p).into()))
    }

    // -- Iteration primitive --------------------------------------------------

    /// Repaint every coordinate of this buffer with the color `f` returns for it.
    ///
    /// Visits pixels in row-major order; `f` must not depend on the order.
    pub fn for_each_pixel(&mut self, mut f: impl FnMut(u32, u32) -> Color) {
        let opaque = self.transparency == Transparency::Opaque;
        for (x, y, pixel) in self.pixels.enumerate_pixels_mut() {
            let mut color = f(x, y);
            if opaque {
                color.a = 255;
            }
            *pixel = color.into();
        }
    }

    // -- Regions ----------------------------------------------------------------

    /// Copy of the pixels inside `region`, which must lie within the buffer.
    pub fn sub_image(&self, region: &Rectangle) -> Result<PixelBuffer> {
        if !region.fits_within(self.width(), self.height()) {
            return Err(TransformError::invalid(format!(
                "Region {}x{} at ({}, {}) does not fit a {}x{} image",
                region.width,
                region.height,
                region.x,
                region.y,
                self.width(),
                self.height()
            )));
        }
        let view = image::imageops::crop_imm(
            &self.pixels,
            region.x as u32,
            region.y as u32,
            region.width as u32,
            region.height as u32,
        );
        Ok(Self {
            pixels: view.to_image(),
            transparency: self.transparency,
        })
    }

    fn admit(&self, color: Color) -> Color {
        match self.transparency {
            Transparency::Opaque => color.with_alpha(255),
            Transparency::Translucent => color,
        }
    }
}
