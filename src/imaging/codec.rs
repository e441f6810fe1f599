//! Codec trait and shared types for getting pixels in and out of files.
//!
//! The transforms never touch the filesystem. Everything that does goes
//! through [`ImageCodec`], which has three operations: identify, decode and
//! encode. The production implementation is
//! [`FileCodec`](super::file_codec::FileCodec), built on the `image` crate;
//! tests swap in a recording mock.

use super::buffer::PixelBuffer;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image codecs.
///
/// `Sync` so one codec can serve every worker of a parallel batch.
pub trait ImageCodec: Sync {
    /// Get image dimensions without decoding pixels where the format allows it.
    fn identify(&self, path: &Path) -> Result<Dimensions, CodecError>;

    /// Decode a file into a pixel buffer.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError>;

    /// Encode a pixel buffer, choosing the format from the path's extension.
    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError>;
}

/// Decode `path`, or `None` if anything at all goes wrong.
///
/// For callers that treat "no image" as a normal outcome, e.g. a file picker
/// that silently ignores unreadable selections.
pub fn read_image(codec: &impl ImageCodec, path: &Path) -> Option<PixelBuffer> {
    codec.decode(path).ok()
}
