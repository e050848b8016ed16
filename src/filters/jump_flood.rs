//! Jump flood propagation.
//!
//! Finds, for every pixel, the nearest opaque source pixel by squared
//! Euclidean distance using the jump flooding algorithm, then recolors
//! transparent pixels from their source.
//!
//! ## Step schedule
//!
//! With `k = ceil(log2(max(width, height)))` the schedule runs two rounds of
//! the classic descending steps `2^(k-1), ..., 2, 1`, i.e. exactly `2k`
//! passes. The second round repairs most of the rare misassignments a single
//! JFA round leaves behind. Results are approximate by nature but visually
//! indistinguishable from an exact nearest-neighbor search.
//!
//! ## Performance
//!
//! Each pass reads the previous pass's grids and writes the next pass's
//! grids (ping-pong buffers). Rows are split into contiguous ranges, one per
//! worker, and processed on a Rayon pool. Every worker writes only its own
//! rows, so no locking is needed and the output is identical for any worker
//! count.

use std::ops::Range;

use ndarray::{Array2, ArrayView2, ArrayView3};
use rayon::prelude::*;

use super::core::{check_rgba, opaque_mask, PadProgress, PaddedImage, OPAQUE};
use crate::error::{PadError, PadResult};

/// Below this pixel count the default worker count is one.
pub const PARALLEL_MIN_PIXELS: usize = 128 * 128;

/// Nearest opaque source as (y, x), `None` while unresolved.
pub type Seed = Option<(usize, usize)>;

// ============================================================================
// Schedule & Partitioning
// ============================================================================

fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        n.next_power_of_two().trailing_zeros() as usize
    }
}

/// Number of jump flood passes for a raster: `2 * ceil(log2(max(width, height)))`.
pub fn pass_count(width: usize, height: usize) -> usize {
    2 * ceil_log2(width.max(height))
}

/// Step offsets for every pass, in execution order.
///
/// # Example
/// A 5x3 raster gives `k = 3` and steps `[4, 2, 1, 4, 2, 1]`.
pub fn jump_flood_steps(width: usize, height: usize) -> Vec<usize> {
    let k = ceil_log2(width.max(height));
    let round = (0..k).rev().map(|i| 1usize << i);
    round.clone().chain(round).collect()
}

/// Split `height` rows into contiguous ranges, one per worker.
///
/// Every range holds `height / workers` rows except the last, which absorbs
/// the remainder. Never returns more ranges than rows.
pub fn row_ranges(height: usize, workers: usize) -> Vec<Range<usize>> {
    if height == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, height);
    let chunk = height / workers;

    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i == workers - 1 { height } else { start + chunk };
            start..end
        })
        .collect()
}

/// Resolve the worker count for a raster of `pixels` pixels.
///
/// `Some(n)` is used as-is and must be at least 1. `None` picks the Rayon
/// default, or a single worker for small rasters.
pub fn resolve_workers(threads: Option<usize>, pixels: usize) -> PadResult<usize> {
    match threads {
        Some(0) => Err(PadError::validation(
            "jump flood 'threads' must be >= 1 when set",
        )),
        Some(n) => Ok(n),
        None if pixels < PARALLEL_MIN_PIXELS => Ok(1),
        None => Ok(rayon::current_num_threads()),
    }
}

fn build_thread_pool(workers: usize) -> PadResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PadError::thread_pool(format!("failed to build rayon thread pool: {e}")))
}

// ============================================================================
// Seed Field
// ============================================================================

/// Result of the nearest-source search.
#[derive(Clone, Debug)]
pub struct SeedField {
    pub width: usize,
    pub height: usize,
    /// Squared distance to the nearest source, row-major.
    pub distance: Vec<u64>,
    /// Nearest source per pixel, row-major.
    pub nearest: Vec<Seed>,
    /// Passes performed.
    pub passes: usize,
}

impl SeedField {
    /// Nearest source of pixel (y, x).
    pub fn nearest_at(&self, y: usize, x: usize) -> Seed {
        self.nearest[y * self.width + x]
    }

    /// Squared distance of pixel (y, x) to its nearest source.
    pub fn distance_at(&self, y: usize, x: usize) -> u64 {
        self.distance[y * self.width + x]
    }

    fn resolved(&self) -> usize {
        self.nearest.iter().filter(|s| s.is_some()).count()
    }
}

/// Previous pass, shared read-only by all workers.
struct Snapshot<'a> {
    width: usize,
    height: usize,
    distance: &'a [u64],
    nearest: &'a [Seed],
}

/// Rows owned by one worker in the next pass.
struct RowJob<'a> {
    rows: Range<usize>,
    distance: &'a mut [u64],
    nearest: &'a mut [Seed],
}

fn split_rows<'a>(
    mut distance: &'a mut [u64],
    mut nearest: &'a mut [Seed],
    ranges: &[Range<usize>],
    width: usize,
) -> Vec<RowJob<'a>> {
    let mut jobs = Vec::with_capacity(ranges.len());
    for rows in ranges {
        let len = rows.len() * width;
        let (d, d_tail) = std::mem::take(&mut distance).split_at_mut(len);
        let (n, n_tail) = std::mem::take(&mut nearest).split_at_mut(len);
        distance = d_tail;
        nearest = n_tail;
        jobs.push(RowJob {
            rows: rows.clone(),
            distance: d,
            nearest: n,
        });
    }
    jobs
}

fn flood_rows(prev: &Snapshot<'_>, job: RowJob<'_>, step: usize) {
    let s = step as isize;
    let offsets: [(isize, isize); 8] = [
        (-s, -s), (0, -s), (s, -s),
        (-s, 0), (s, 0),
        (-s, s), (0, s), (s, s),
    ];
    let width = prev.width;

    for (local_y, y) in job.rows.clone().enumerate() {
        for x in 0..width {
            let idx = y * width + x;
            let mut best = prev.distance[idx];
            let mut best_seed = prev.nearest[idx];

            for (dx, dy) in offsets {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || nx >= width as isize || ny < 0 || ny >= prev.height as isize {
                    continue;
                }

                if let Some((sy, sx)) = prev.nearest[ny as usize * width + nx as usize] {
                    let ddx = x.abs_diff(sx) as u64;
                    let ddy = y.abs_diff(sy) as u64;
                    let d = ddx * ddx + ddy * ddy;
                    if d < best {
                        best = d;
                        best_seed = Some((sy, sx));
                    }
                }
            }

            let local = local_y * width + x;
            job.distance[local] = best;
            job.nearest[local] = best_seed;
        }
    }
}

/// Compute the nearest opaque source of every pixel.
///
/// # Arguments
/// * `mask` - Opaque mask (height, width)
/// * `threads` - Worker count override, see [`resolve_workers`]
/// * `progress` - Called after every pass
pub fn nearest_sources(
    mask: ArrayView2<bool>,
    threads: Option<usize>,
    progress: &mut dyn FnMut(&PadProgress),
) -> PadResult<SeedField> {
    let (height, width) = mask.dim();
    let total = width * height;
    let infinite = (width * width + height * height) as u64;

    let mut distance: Vec<u64> = mask.iter().map(|&m| if m { 0 } else { infinite }).collect();
    let mut nearest: Vec<Seed> = mask
        .indexed_iter()
        .map(|((y, x), &m)| m.then_some((y, x)))
        .collect();
    let mut next_distance = distance.clone();
    let mut next_nearest = nearest.clone();

    let steps = jump_flood_steps(width, height);
    let workers = resolve_workers(threads, total)?;
    let ranges = row_ranges(height, workers);
    let pool = if ranges.len() > 1 {
        Some(build_thread_pool(ranges.len())?)
    } else {
        None
    };
    tracing::debug!(workers = ranges.len(), passes = steps.len(), "jump flood schedule");

    for (i, &step) in steps.iter().enumerate() {
        let prev = Snapshot {
            width,
            height,
            distance: &distance,
            nearest: &nearest,
        };
        let jobs = split_rows(&mut next_distance, &mut next_nearest, &ranges, width);

        match &pool {
            Some(pool) => pool.install(|| {
                jobs.into_par_iter()
                    .for_each(|job| flood_rows(&prev, job, step));
            }),
            None => jobs.into_iter().for_each(|job| flood_rows(&prev, job, step)),
        }

        std::mem::swap(&mut distance, &mut next_distance);
        std::mem::swap(&mut nearest, &mut next_nearest);

        let resolved = nearest.iter().filter(|s| s.is_some()).count();
        tracing::debug!(pass = i + 1, step, resolved, "jump flood pass");
        progress(&PadProgress {
            pass: i + 1,
            total_passes: Some(steps.len()),
            resolved,
            total,
        });
    }

    Ok(SeedField {
        width,
        height,
        distance,
        nearest,
        passes: steps.len(),
    })
}

// ============================================================================
// RGBA Padding
// ============================================================================

/// Pad an RGBA image with the colors of the nearest opaque pixels.
///
/// Opaque pixels are copied unchanged. Transparent pixels take the color of
/// their nearest source with alpha forced to 255. If the input has no opaque
/// pixel the output is transparent black.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `threads` - Worker count override, see [`resolve_workers`]
/// * `progress` - Called after every pass
#[tracing::instrument(skip(input, progress), fields(height = input.dim().0, width = input.dim().1))]
pub fn jump_flood_rgba(
    input: ArrayView3<u8>,
    threads: Option<usize>,
    progress: &mut dyn FnMut(&PadProgress),
) -> PadResult<PaddedImage> {
    check_rgba(&input)?;
    let (height, width, _) = input.dim();

    let mask: Array2<bool> = opaque_mask(input);
    let field = nearest_sources(mask.view(), threads, progress)?;

    let mut output = input.to_owned();
    let mut unresolved = 0;
    for y in 0..height {
        for x in 0..width {
            if mask[[y, x]] {
                continue;
            }
            match field.nearest_at(y, x) {
                Some((sy, sx)) => {
                    for c in 0..3 {
                        output[[y, x, c]] = input[[sy, sx, c]];
                    }
                    output[[y, x, 3]] = OPAQUE;
                }
                None => {
                    for c in 0..4 {
                        output[[y, x, c]] = 0;
                    }
                    unresolved += 1;
                }
            }
        }
    }

    if unresolved > 0 {
        tracing::warn!(unresolved, "no opaque source pixels, output is fully transparent");
    }
    tracing::info!(passes = field.passes, resolved = field.resolved(), "jump flood finished");

    Ok(PaddedImage {
        image: output,
        passes: field.passes,
        unresolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array3};

    fn opaque(img: &mut Array3<u8>, y: usize, x: usize, rgb: [u8; 3]) {
        img[[y, x, 0]] = rgb[0];
        img[[y, x, 1]] = rgb[1];
        img[[y, x, 2]] = rgb[2];
        img[[y, x, 3]] = 255;
    }

    fn run(img: &Array3<u8>, threads: Option<usize>) -> PaddedImage {
        jump_flood_rgba(img.view(), threads, &mut |_| {}).unwrap()
    }

    /// Deterministic sparse seeds with pseudo-random colors.
    fn scattered(height: usize, width: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((height, width, 4));
        let mut state: u32 = 0x2545_f491;
        for y in 0..height {
            for x in 0..width {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                if (state >> 16) % 23 == 0 {
                    let c = state.to_le_bytes();
                    opaque(&mut img, y, x, [c[1], c[2], c[3]]);
                } else {
                    img[[y, x, 3]] = (state >> 24) as u8 % 200;
                }
            }
        }
        img
    }

    #[test]
    fn test_steps_and_pass_count() {
        assert_eq!(jump_flood_steps(5, 3), vec![4, 2, 1, 4, 2, 1]);
        assert_eq!(jump_flood_steps(1, 1), Vec::<usize>::new());
        assert_eq!(pass_count(8, 8), 6);
        assert_eq!(pass_count(2, 9), 8);
        assert_eq!(pass_count(1, 2), 2);
    }

    #[test]
    fn test_row_ranges_last_absorbs_remainder() {
        assert_eq!(row_ranges(10, 3), vec![0..3, 3..6, 6..10]);
        assert_eq!(row_ranges(2, 8), vec![0..1, 1..2]);
        assert_eq!(row_ranges(5, 1), vec![0..5]);
        assert!(row_ranges(0, 4).is_empty());
    }

    #[test]
    fn test_resolve_workers() {
        assert!(matches!(resolve_workers(Some(0), 10), Err(PadError::Validation(_))));
        assert_eq!(resolve_workers(Some(3), 10).unwrap(), 3);
        assert_eq!(resolve_workers(None, 10).unwrap(), 1);
    }

    #[test]
    fn test_center_takes_nearest_4_neighbor() {
        let mut img = Array3::<u8>::zeros((3, 3, 4));
        for y in 0..3 {
            for x in 0..3 {
                if y == 1 && x == 1 {
                    continue;
                }
                let corner = y != 1 && x != 1;
                let rgb = if corner { [0, 0, 255] } else { [255, 0, 0] };
                opaque(&mut img, y, x, rgb);
            }
        }

        let result = run(&img, None);

        assert_eq!(result.passes, 4);
        assert_eq!(result.image.slice(s![1, 1, ..]).to_vec(), vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_performs_exact_pass_count() {
        let img = scattered(7, 20);
        let mut passes = Vec::new();
        let result = jump_flood_rgba(img.view(), Some(2), &mut |p| {
            assert_eq!(p.total_passes, Some(10));
            passes.push(p.pass);
        })
        .unwrap();

        assert_eq!(result.passes, 10);
        assert_eq!(passes, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_seed_floods_everything() {
        let mut img = Array3::<u8>::zeros((6, 11, 4));
        opaque(&mut img, 4, 2, [12, 34, 56]);

        let result = run(&img, Some(3));

        assert_eq!(result.unresolved, 0);
        for y in 0..6 {
            for x in 0..11 {
                assert_eq!(result.image.slice(s![y, x, ..]).to_vec(), vec![12, 34, 56, 255]);
            }
        }
    }

    #[test]
    fn test_two_columns_split_at_midline() {
        let (height, width) = (6, 9);
        let mut img = Array3::<u8>::zeros((height, width, 4));
        for y in 0..height {
            opaque(&mut img, y, 0, [255, 0, 0]);
            opaque(&mut img, y, width - 1, [0, 0, 255]);
        }

        let result = run(&img, None);

        for y in 0..height {
            for x in 0..4 {
                assert_eq!(result.image[[y, x, 0]], 255, "({y}, {x}) should be red");
            }
            for x in 5..width {
                assert_eq!(result.image[[y, x, 2]], 255, "({y}, {x}) should be blue");
            }
        }
    }

    #[test]
    fn test_distances_match_single_seed() {
        let mut mask = Array2::<bool>::from_elem((5, 5), false);
        mask[[0, 0]] = true;

        let field = nearest_sources(mask.view(), None, &mut |_| {}).unwrap();

        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(field.nearest_at(y, x), Some((0, 0)));
                assert_eq!(field.distance_at(y, x), (y * y + x * x) as u64);
            }
        }
    }

    #[test]
    fn test_opaque_pixels_preserved() {
        let img = scattered(13, 17);
        let result = run(&img, None);

        for y in 0..13 {
            for x in 0..17 {
                assert_eq!(result.image[[y, x, 3]], 255);
                if img[[y, x, 3]] == 255 {
                    assert_eq!(result.image.slice(s![y, x, ..]), img.slice(s![y, x, ..]));
                }
            }
        }
    }

    #[test]
    fn test_worker_count_does_not_change_output() {
        let img = scattered(37, 29);

        let single = run(&img, Some(1));
        for threads in [2, 3, 8, 64] {
            let multi = run(&img, Some(threads));
            assert_eq!(single.image, multi.image, "threads = {threads}");
        }
    }

    #[test]
    fn test_all_transparent_gives_transparent_black() {
        let mut img = Array3::<u8>::zeros((4, 4, 4));
        img[[2, 2, 1]] = 90;
        img[[2, 2, 3]] = 254;

        let result = run(&img, None);

        assert_eq!(result.unresolved, 16);
        assert!(result.image.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_single_pixel() {
        let mut img = Array3::<u8>::zeros((1, 1, 4));
        opaque(&mut img, 0, 0, [1, 2, 3]);
        let result = run(&img, None);
        assert_eq!(result.passes, 0);
        assert_eq!(result.image, img);
    }
}
