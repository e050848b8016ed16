//! UV padding: algorithm selection and the common entry points.
//!
//! Both engines implement [`PadAlgorithm`]. Callers usually go through
//! [`pad_rgba`] with a [`PadOptions`] value instead of naming an engine.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView3;

use super::core::{PadProgress, PaddedImage};
use super::iterative::iterative_average_rgba;
use super::jump_flood::jump_flood_rgba;
use crate::error::{PadError, PadResult};

/// A way of filling transparent pixels from opaque ones.
pub trait PadAlgorithm {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Pad `input`, reporting progress after every pass.
    fn pad(
        &self,
        input: ArrayView3<u8>,
        progress: &mut dyn FnMut(&PadProgress),
    ) -> PadResult<PaddedImage>;
}

/// Iterative 4-neighbor averaging. Single-threaded.
#[derive(Clone, Copy, Debug, Default)]
pub struct IterativeAverage;

impl PadAlgorithm for IterativeAverage {
    fn name(&self) -> &'static str {
        "iterative"
    }

    fn pad(
        &self,
        input: ArrayView3<u8>,
        progress: &mut dyn FnMut(&PadProgress),
    ) -> PadResult<PaddedImage> {
        iterative_average_rgba(input, progress)
    }
}

/// Jump flood nearest-source propagation.
#[derive(Clone, Copy, Debug, Default)]
pub struct JumpFlood {
    /// Worker count override; `None` picks one from the raster size.
    pub threads: Option<usize>,
}

impl PadAlgorithm for JumpFlood {
    fn name(&self) -> &'static str {
        "jump_flood"
    }

    fn pad(
        &self,
        input: ArrayView3<u8>,
        progress: &mut dyn FnMut(&PadProgress),
    ) -> PadResult<PaddedImage> {
        jump_flood_rgba(input, self.threads, progress)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Algorithm selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Slower, blends neighbor colors. See [`IterativeAverage`].
    IterativeAverage,
    /// Fast nearest-color fill. See [`JumpFlood`].
    #[default]
    JumpFlood,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::IterativeAverage => f.write_str("iterative"),
            Algorithm::JumpFlood => f.write_str("jump_flood"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "iterative" | "ia" | "gimp" => Ok(Algorithm::IterativeAverage),
            "jump_flood" | "jfp" | "jfa" | "paint_net" => Ok(Algorithm::JumpFlood),
            other => Err(PadError::validation(format!(
                "unknown padding algorithm '{other}', expected 'iterative' or 'jump_flood'"
            ))),
        }
    }
}

/// Options for [`pad_rgba`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PadOptions {
    pub algorithm: Algorithm,
    /// Jump flood worker count. Ignored by iterative averaging.
    pub threads: Option<usize>,
}

impl PadOptions {
    /// The engine these options select.
    pub fn engine(&self) -> Box<dyn PadAlgorithm> {
        match self.algorithm {
            Algorithm::IterativeAverage => Box::new(IterativeAverage),
            Algorithm::JumpFlood => Box::new(JumpFlood {
                threads: self.threads,
            }),
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Fill transparent pixels of an RGBA image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4), not modified
/// * `options` - Algorithm and worker settings
///
/// # Returns
/// Padded image of the same shape
pub fn pad_rgba(input: ArrayView3<u8>, options: &PadOptions) -> PadResult<PaddedImage> {
    pad_rgba_with_progress(input, options, &mut |_| {})
}

/// Same as [`pad_rgba`], calling `progress` after every pass.
pub fn pad_rgba_with_progress(
    input: ArrayView3<u8>,
    options: &PadOptions,
    progress: &mut dyn FnMut(&PadProgress),
) -> PadResult<PaddedImage> {
    let engine = options.engine();
    tracing::debug!(algorithm = engine.name(), "padding image");
    engine.pad(input, progress)
}
