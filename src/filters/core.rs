//! Core utilities shared by the padding engines.
//!
//! This module provides:
//! - RGBA shape validation
//! - Opaque mask extraction
//! - 16-bit working precision helpers used when blending colors
//! - Per-pass progress reporting types

use ndarray::{Array2, Array3, ArrayView3};

use crate::error::{PadError, PadResult};

/// Alpha value of a fully opaque pixel.
pub const OPAQUE: u8 = u8::MAX;

/// Number of channels in an RGBA raster.
pub const RGBA_CHANNELS: usize = 4;

// ============================================================================
// Raster checks
// ============================================================================

/// Ensure the array is an RGBA raster of shape (height, width, 4).
///
/// Zero-sized rasters are accepted; they simply produce empty output.
pub fn check_rgba(input: &ArrayView3<u8>) -> PadResult<()> {
    let (_, _, channels) = input.dim();
    if channels != RGBA_CHANNELS {
        return Err(PadError::validation(format!(
            "expected an RGBA raster with {RGBA_CHANNELS} channels, got {channels}"
        )));
    }
    Ok(())
}

/// Returns true if the pixel at (y, x) is fully opaque.
#[inline]
pub fn is_opaque(input: &ArrayView3<u8>, y: usize, x: usize) -> bool {
    input[[y, x, 3]] == OPAQUE
}

// ============================================================================
// Opaque Mask
// ============================================================================

/// Build the opaque mask of an RGBA raster.
///
/// `mask[[y, x]]` is true iff the input pixel has alpha 255. Partially
/// transparent pixels count as transparent.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
///
/// # Returns
/// Boolean mask of shape (height, width)
pub fn opaque_mask(input: ArrayView3<u8>) -> Array2<bool> {
    let (height, width, _) = input.dim();
    Array2::from_shape_fn((height, width), |(y, x)| is_opaque(&input, y, x))
}

/// Count pixels that are not fully opaque.
pub fn count_transparent(input: ArrayView3<u8>) -> usize {
    let (height, width, _) = input.dim();
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (y, x)))
        .filter(|&(y, x)| !is_opaque(&input, y, x))
        .count()
}

/// All-zero raster with the same shape as `input`.
///
/// This is the result of padding a raster that has no opaque pixels.
pub fn transparent_black(input: ArrayView3<u8>) -> Array3<u8> {
    Array3::<u8>::zeros(input.dim())
}

// ============================================================================
// 16-bit Working Precision
// ============================================================================

/// Expand an 8-bit channel to 16 bits (0-255 -> 0-65535).
#[inline]
pub fn widen(v: u8) -> u16 {
    (v as u16) * 257
}

/// Reduce a 16-bit channel to 8 bits by dropping the low byte.
#[inline]
pub fn narrow(v: u16) -> u8 {
    (v >> 8) as u8
}

// ============================================================================
// Results
// ============================================================================

/// Output of a padding engine.
#[derive(Clone, Debug)]
pub struct PaddedImage {
    /// Padded RGBA raster, same shape as the input.
    pub image: Array3<u8>,
    /// Number of propagation passes performed.
    pub passes: usize,
    /// Pixels left without a color source (non-zero only when the input had
    /// no opaque pixels at all).
    pub unresolved: usize,
}

// ============================================================================
// Progress
// ============================================================================

/// Snapshot of an engine's state after a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PadProgress {
    /// 1-based index of the pass that just finished.
    pub pass: usize,
    /// Total passes if known up front (jump flood), `None` for iterative averaging.
    pub total_passes: Option<usize>,
    /// Pixels that have a color source.
    pub resolved: usize,
    /// Total pixels in the raster.
    pub total: usize,
}

impl PadProgress {
    /// Pixels still waiting for a color.
    pub fn remaining(&self) -> usize {
        self.total - self.resolved
    }

    /// Fraction of resolved pixels in 0.0-1.0. Empty rasters report 1.0.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.resolved as f32 / self.total as f32
        }
    }
}
