//! File codec backed by the `image` crate.
//!
//! ## Format mapping
//!
//! | Extension | Format | Notes |
//! |---|---|---|
//! | `png` | PNG | RGB8 or RGBA8 |
//! | `jpg`, `jpeg` | JPEG | always written as RGB8, alpha is dropped |
//! | `tif`, `tiff` | TIFF | RGB8 or RGBA8 |
//! | `webp` | WebP | lossless encoder |
//!
//! Decoding inspects the file contents, not just the extension, so a PNG
//! named `.jpg` still opens. Encoding picks the format from the extension.
//! Opaque buffers are written without an alpha channel.

use super::buffer::PixelBuffer;
use super::codec::{CodecError, Dimensions, ImageCodec};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions whose codecs are compiled in.
const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an extension this codec can decode (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    extension(path).is_some_and(|ext| supported_input_extensions().contains(&ext.as_str()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Output format for `path`, from its extension.
fn output_format(path: &Path) -> Result<ImageFormat, CodecError> {
    let ext = extension(path).unwrap_or_default();
    CANDIDATES
        .iter()
        .find(|(candidate, fmt)| *candidate == ext && fmt.writing_enabled())
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| CodecError::UnsupportedFormat(format!("{} ({})", ext, path.display())))
}

/// Codec reading and writing image files through the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCodec;

impl FileCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for FileCodec {
    fn identify(&self, path: &Path) -> Result<Dimensions, CodecError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| CodecError::Decode {
            path: path.to_path_buf(),
            message: format!("failed to read dimensions: {e}"),
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| CodecError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let buffer = PixelBuffer::from_dynamic(&img);
        debug!(
            path = %path.display(),
            width = buffer.width(),
            height = buffer.height(),
            transparency = ?buffer.transparency(),
            "Image decoded"
        );
        Ok(buffer)
    }

    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError> {
        let format = output_format(path)?;
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(buffer.to_dynamic().to_rgb8()),
            _ => buffer.to_dynamic(),
        };
        img.save_with_format(path, format)
            .map_err(|e| CodecError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), ?format, "Image encoded");
        Ok(())
    }
}
