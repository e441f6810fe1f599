//! Pure calculation functions for image dimensions and sample coordinates.
//!
//! All functions here are pure and testable without any pixels.

use super::error::{Result, TransformError};

/// Resolve the requested resize target against the source dimensions.
///
/// A zero on one axis means "keep the aspect ratio": that axis is derived from
/// the other as `original_missing * (given / original_given)`, truncated.
///
/// # Examples
/// ```
/// # use pixmend::imaging::calculations::resolve_target_dimensions;
/// assert_eq!(resolve_target_dimensions((100, 100), (0, 50)).unwrap(), (50, 50));
/// assert_eq!(resolve_target_dimensions((400, 300), (200, 0)).unwrap(), (200, 150));
/// assert!(resolve_target_dimensions((400, 300), (0, 0)).is_err());
/// ```
pub fn resolve_target_dimensions(source: (u32, u32), target: (i32, i32)) -> Result<(u32, u32)> {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    if tgt_w < 0 || tgt_h < 0 {
        return Err(TransformError::invalid(format!(
            "Target width and target height must not be negative - got {tgt_w}x{tgt_h}"
        )));
    }
    if tgt_w == 0 && tgt_h == 0 {
        return Err(TransformError::invalid(
            "Target width and target height cannot both be zero",
        ));
    }

    let width = if tgt_w == 0 {
        derive_missing(src_w, tgt_h as u32, src_h, "width")?
    } else {
        tgt_w as u32
    };
    let height = if tgt_h == 0 {
        derive_missing(src_h, width, src_w, "height")?
    } else {
        tgt_h as u32
    };
    Ok((width, height))
}

fn derive_missing(original_missing: u32, given: u32, original_given: u32, axis: &str) -> Result<u32> {
    if original_given == 0 {
        return Err(TransformError::invalid(format!(
            "Cannot derive target {axis} from an image with zero size on the other axis"
        )));
    }
    Ok((original_missing as f64 * (given as f64 / original_given as f64)) as u32)
}

/// One progressive-resize step along a single axis.
///
/// Halves when above the target, doubles when below, and snaps to the target
/// once a step would overshoot it. `current` must be non-zero unless it
/// already equals `target`.
///
/// # Examples
/// ```
/// # use pixmend::imaging::calculations::next_progressive_step;
/// assert_eq!(next_progressive_step(1000, 300), 500);
/// assert_eq!(next_progressive_step(500, 300), 300);
/// assert_eq!(next_progressive_step(100, 300), 200);
/// assert_eq!(next_progressive_step(200, 300), 300);
/// ```
pub fn next_progressive_step(current: u32, target: u32) -> u32 {
    let mut next = current;
    if next > target {
        next /= 2;
        if next < target {
            next = target;
        }
    }
    if next < target {
        next = next.saturating_mul(2);
        if next > target {
            next = target;
        }
    }
    next
}

/// Every intermediate size a progressive resize passes through, ending with
/// the target. Each step moves both axes by [`next_progressive_step`].
///
/// Always holds at least one entry; an axis of zero can only step to zero.
pub fn progressive_steps(source: (u32, u32), target: (u32, u32)) -> Vec<(u32, u32)> {
    let mut steps = Vec::new();
    let (mut w, mut h) = source;
    loop {
        let next = (next_progressive_step(w, target.0), next_progressive_step(h, target.1));
        steps.push(next);
        if next == target || next == (w, h) {
            break;
        }
        (w, h) = next;
    }
    steps
}

/// Convert a crop percentage of `dimension` into pixels, rounding half away
/// from zero.
///
/// # Examples
/// ```
/// # use pixmend::imaging::calculations::percent_of;
/// assert_eq!(percent_of(10, 25), 3); // 2.5 -> 3
/// assert_eq!(percent_of(10, 24), 2); // 2.4 -> 2
/// ```
pub fn percent_of(dimension: u32, percent: i32) -> i32 {
    let exact = dimension as f64 * percent as f64 / 100.0;
    exact.round() as i32
}

/// Source index for target index `dst` under nearest-neighbor scaling.
///
/// The target pixel's center is mapped into source space and the source pixel
/// containing it is taken: `floor((dst + 0.5) * src_len / dst_len)`.
pub fn nearest_source(dst: u32, dst_len: u32, src_len: u32) -> u32 {
    let scaled = (2 * dst as u64 + 1) * src_len as u64 / (2 * dst_len as u64);
    (scaled as u32).min(src_len.saturating_sub(1))
}

/// The two source indices around a bilinear sample point and the weight of
/// the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSample {
    pub lower: u32,
    pub upper: u32,
    pub weight: f32,
}

/// Sample position for target index `dst` under bilinear scaling.
///
/// Pixel centers are aligned (`(dst + 0.5) * src_len / dst_len - 0.5`) and
/// positions outside the source are clamped to the edge pixels.
pub fn linear_source(dst: u32, dst_len: u32, src_len: u32) -> LinearSample {
    let last = src_len.saturating_sub(1);
    let center = (dst as f64 + 0.5) * src_len as f64 / dst_len as f64 - 0.5;
    let center = center.clamp(0.0, last as f64);
    let lower = center.floor() as u32;
    LinearSample {
        lower,
        upper: (lower + 1).min(last),
        weight: (center - lower as f64) as f32,
    }
}
