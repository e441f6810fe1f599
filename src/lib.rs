//! # pixmend
//!
//! Pixel-buffer transforms for RGBA images: resize, flip, rotate, crop and
//! per-pixel color algebra, plus the file handling, configuration and
//! batch runner that turn them into a command-line tool.
//!
//! # Architecture
//!
//! ```text
//! file ──decode──▶ PixelBuffer ──step──▶ … ──step──▶ PixelBuffer ──encode──▶ file
//!        (codec)                 (imaging transforms)                (codec)
//! ```
//!
//! Every transform borrows a buffer and returns a new one. Only the codec
//! touches the filesystem, so the transforms are unit tested on synthetic
//! buffers and the pipeline is tested against an in-memory codec.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | `PixelBuffer`, `Color`, the transforms, and the codec boundary |
//! | [`pipeline`] | `Step` definitions, applying steps to files, parallel batches |
//! | [`config`] | `pixmend.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Opaque Is a Buffer Property
//!
//! A [`imaging::PixelBuffer`] is either opaque or translucent. Opaque buffers
//! force alpha to 255 on every write, so a transform can never make an RGB
//! image partially transparent by accident, and encoders write them without
//! an alpha channel.
//!
//! ## Progressive Resizing
//!
//! High-quality resizing never changes an axis by more than 2x in one
//! bilinear pass. Large reductions go through halving steps, which keeps
//! every source pixel contributing to the result.
//!
//! ## Invalid Arguments Fail Up Front
//!
//! Negative sizes, oversized crops, out-of-range thresholds and unsupported
//! rotations are rejected before any pixel is allocated. Config steps are
//! checked when the config loads, so a batch does not fail halfway through
//! on a typo.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
