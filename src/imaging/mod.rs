//! Pixel-buffer transforms: pure functions over owned RGBA grids.
//!
//! | Operation | Function |
//! |---|---|
//! | **Resize** | [`resize`] (nearest neighbor or progressive bilinear) |
//! | **Flip** | [`flip`], [`flip_horizontally`], [`flip_vertically`] |
//! | **Rotate** | [`rotate_by_90_degrees`], [`rotate_by_180_degrees`], [`rotate_by_270_degrees`] |
//! | **Crop** | [`crop`], [`crop_by_percentage`], [`PixelBuffer::sub_image`] |
//! | **Color** | [`invert_colors`], [`convert_to_grayscale`], [`replace_color`] |
//! | **Files** | [`ImageCodec`] + [`FileCodec`] |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`] and the per-pixel iteration primitive
//! - **Calculations**: Pure functions for dimension and sample math (unit testable)
//! - **Parameters**: Data structures describing transforms
//! - **Transforms**: `resize`, `geometry` and `color`, all built on the buffer
//! - **Codec**: [`ImageCodec`] trait + [`FileCodec`], the only part doing I/O

pub mod buffer;
pub mod calculations;
pub mod codec;
pub mod color;
mod error;
pub mod file_codec;
pub mod geometry;
mod params;
pub mod resize;

pub use buffer::{PixelBuffer, Rectangle, Transparency};
pub use codec::{CodecError, Dimensions, ImageCodec, read_image};
pub use color::{
    Color, convert_to_grayscale, invert_colors, is_color_within_range, replace_color,
    replace_exact_color,
};
pub use error::{Result, TransformError};
pub use file_codec::{FileCodec, is_supported_image, supported_input_extensions};
pub use geometry::{
    crop, crop_by_percentage, crop_by_percentage_margins, crop_margins, flip, flip_horizontally,
    flip_vertically, rotate, rotate_by_90_degrees, rotate_by_180_degrees, rotate_by_270_degrees,
};
pub use params::{Margins, ResizeQuality, Rotation};
pub use resize::{instant_resize, progressive_resize, resize};
