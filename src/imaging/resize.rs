//! Resizing: nearest-neighbor in one pass, or progressive bilinear.
//!
//! Progressive resizing never makes a jump larger than 2x on either axis.
//! Each iteration halves or doubles both axes toward the target (snapping
//! when it would overshoot) and resamples the previous intermediate
//! bilinearly. Going from 4000px to 300px is 4000 → 2000 → 1000 → 500 → 300,
//! four bilinear passes instead of one that would skip most source pixels.
//!
//! Bilinear blending is done on premultiplied alpha so fully transparent
//! neighbors do not bleed their (meaningless) color into visible pixels.
//! For opaque buffers this is plain bilinear interpolation.

use super::buffer::PixelBuffer;
use super::calculations::{
    LinearSample, linear_source, nearest_source, progressive_steps, resolve_target_dimensions,
};
use super::color::Color;
use super::error::{Result, TransformError};
use super::params::ResizeQuality;
use std::borrow::Cow;
use tracing::{debug, instrument};

/// Resize to `target_width x target_height`.
///
/// A zero on one axis keeps the aspect ratio (see
/// [`resolve_target_dimensions`]). When the resolved size equals the current
/// size the input comes back borrowed and nothing is allocated.
///
/// # Errors
/// [`TransformError::InvalidArgument`] for a negative target, a `0 x 0`
/// target, a target too large to allocate, or a non-empty target for an
/// image without pixels.
#[instrument(skip(buffer), fields(from_w = buffer.width(), from_h = buffer.height()))]
pub fn resize(
    buffer: &PixelBuffer,
    target_width: i32,
    target_height: i32,
    quality: ResizeQuality,
) -> Result<Cow<'_, PixelBuffer>> {
    let (width, height) = resolve_target_dimensions(buffer.dimensions(), (target_width, target_height))?;

    if (width, height) == buffer.dimensions() {
        debug!("Target equals source size, nothing to do");
        return Ok(Cow::Borrowed(buffer));
    }

    let resized = match quality {
        ResizeQuality::Fast => instant_resize(buffer, width, height)?,
        ResizeQuality::HighQuality => progressive_resize(buffer, width, height)?,
    };
    Ok(Cow::Owned(resized))
}

/// Nearest-neighbor resize: each target pixel copies the source pixel under
/// its center. Fast, blocky when enlarging.
pub fn instant_resize(buffer: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer> {
    ensure_samplable(buffer, width, height)?;
    let (src_w, src_h) = buffer.dimensions();

    let columns: Vec<u32> = (0..width).map(|x| nearest_source(x, width, src_w)).collect();
    let rows: Vec<u32> = (0..height).map(|y| nearest_source(y, height, src_h)).collect();

    Ok(PixelBuffer::from_fn(width, height, buffer.transparency(), |x, y| {
        buffer.pixel(columns[x as usize], rows[y as usize])
    }))
}

/// Progressive bilinear resize through halving/doubling steps.
///
/// Every intermediate replaces the previous one, which is dropped right away.
pub fn progressive_resize(buffer: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer> {
    ensure_samplable(buffer, width, height)?;

    let mut current = Cow::Borrowed(buffer);
    for (step_w, step_h) in progressive_steps(buffer.dimensions(), (width, height)) {
        debug!(step_w, step_h, "Progressive resize step");
        current = Cow::Owned(bilinear_resample(&current, step_w, step_h));
    }
    Ok(current.into_owned())
}

/// One bilinear pass from `source` to `width x height`.
fn bilinear_resample(source: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let (src_w, src_h) = source.dimensions();
    let columns: Vec<LinearSample> = (0..width).map(|x| linear_source(x, width, src_w)).collect();
    let rows: Vec<LinearSample> = (0..height).map(|y| linear_source(y, height, src_h)).collect();

    PixelBuffer::from_fn(width, height, source.transparency(), |x, y| {
        let sx = columns[x as usize];
        let sy = rows[y as usize];
        blend(
            [
                source.pixel(sx.lower, sy.lower),
                source.pixel(sx.upper, sy.lower),
                source.pixel(sx.lower, sy.upper),
                source.pixel(sx.upper, sy.upper),
            ],
            [
                (1.0 - sx.weight) * (1.0 - sy.weight),
                sx.weight * (1.0 - sy.weight),
                (1.0 - sx.weight) * sy.weight,
                sx.weight * sy.weight,
            ],
        )
    })
}

/// Weighted premultiplied-alpha average of four colors.
fn blend(corners: [Color; 4], weights: [f32; 4]) -> Color {
    let mut sum = [0.0f32; 4];
    for (color, weight) in corners.into_iter().zip(weights) {
        let [r, g, b, a] = color.channels();
        let coverage = a as f32 * weight;
        sum[0] += r as f32 * coverage;
        sum[1] += g as f32 * coverage;
        sum[2] += b as f32 * coverage;
        sum[3] += coverage;
    }
    if sum[3] <= 0.0 {
        return Color::TRANSPARENT;
    }
    let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    Color::rgba(
        channel(sum[0] / sum[3]),
        channel(sum[1] / sum[3]),
        channel(sum[2] / sum[3]),
        channel(sum[3]),
    )
}

/// An image without pixels can only be resized to another image without pixels.
fn ensure_samplable(buffer: &PixelBuffer, width: u32, height: u32) -> Result<()> {
    if buffer.is_empty() && width > 0 && height > 0 {
        return Err(TransformError::invalid(format!(
            "Cannot resize a {}x{} image to {width}x{height}: it has no pixels to sample",
            buffer.width(),
            buffer.height()
        )));
    }
    let bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4));
    if !bytes.is_some_and(|n| n <= isize::MAX as usize) {
        return Err(TransformError::invalid(format!(
            "Cannot resize to {width}x{height}: the image would not fit in memory"
        )));
    }
    Ok(())
}
