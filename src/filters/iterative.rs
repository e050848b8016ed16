//! Iterative neighbor averaging.
//!
//! Each pass fills every transparent pixel that touches at least one opaque
//! 4-connected neighbor with the mean color of those neighbors. The opaque
//! region grows by one ring per pass, so the pass count equals the largest
//! 4-connected distance from a transparent pixel to its nearest opaque pixel.
//!
//! Colors are blended at 16-bit precision and truncated back to 8 bits.
//! Reads within a pass come from a snapshot taken before the pass, so the
//! result does not depend on scan order.

use ndarray::ArrayView3;

use super::core::{
    check_rgba, count_transparent, narrow, transparent_black, widen, PadProgress, PaddedImage,
    OPAQUE,
};
use crate::error::PadResult;

/// Up, down, left, right as (dy, dx).
const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Pad an RGBA image by iterative 4-neighbor averaging.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `progress` - Called after every pass with the remaining pixel count
///
/// # Returns
/// Padded image plus the number of passes. If the input has no opaque pixel,
/// returns transparent black after zero passes.
#[tracing::instrument(skip_all, fields(height = input.dim().0, width = input.dim().1))]
pub fn iterative_average_rgba(
    input: ArrayView3<u8>,
    progress: &mut dyn FnMut(&PadProgress),
) -> PadResult<PaddedImage> {
    check_rgba(&input)?;
    let (height, width, _) = input.dim();
    let total = height * width;

    let mut remaining = count_transparent(input);
    if remaining > 0 && remaining == total {
        tracing::warn!("no opaque source pixels, output is fully transparent");
        return Ok(PaddedImage {
            image: transparent_black(input),
            passes: 0,
            unresolved: total,
        });
    }

    let mut current = input.to_owned();
    let mut passes = 0;

    while remaining > 0 {
        let snapshot = current.clone();
        let mut filled = 0;

        for y in 0..height {
            for x in 0..width {
                if snapshot[[y, x, 3]] == OPAQUE {
                    continue;
                }

                let mut sum = [0u32; 3];
                let mut count = 0u32;
                for (dy, dx) in NEIGHBORS_4 {
                    let ny = y as isize + dy;
                    let nx = x as isize + dx;
                    if ny < 0 || ny >= height as isize || nx < 0 || nx >= width as isize {
                        continue;
                    }
                    let (ny, nx) = (ny as usize, nx as usize);
                    if snapshot[[ny, nx, 3]] != OPAQUE {
                        continue;
                    }
                    for c in 0..3 {
                        sum[c] += widen(snapshot[[ny, nx, c]]) as u32;
                    }
                    count += 1;
                }

                if count > 0 {
                    for c in 0..3 {
                        current[[y, x, c]] = narrow((sum[c] / count) as u16);
                    }
                    current[[y, x, 3]] = OPAQUE;
                    filled += 1;
                }
            }
        }

        // A raster with at least one opaque pixel always grows by one ring.
        debug_assert!(filled > 0);
        remaining -= filled;
        passes += 1;

        let state = PadProgress {
            pass: passes,
            total_passes: None,
            resolved: total - remaining,
            total,
        };
        tracing::debug!(
            pass = passes,
            remaining,
            percent = f64::from(state.fraction()) * 100.0,
            "iterative pass"
        );
        progress(&state);
    }

    tracing::info!(passes, "iterative averaging finished");
    Ok(PaddedImage {
        image: current,
        passes,
        unresolved: 0,
    })
}
