//! UVPad Rust Extensions
//!
//! Texture dilation ("UV padding"): fills transparent pixels of an RGBA
//! texture with colors extrapolated from the nearest opaque pixels, so that
//! mipmapping and filtering do not bleed transparent gutters into UV islands.
//! Python bindings via PyO3 and WASM bindings for JavaScript are optional.
//!
//! ## Image Format
//! Images are `(height, width, 4)` RGBA arrays with `u8` channels. A pixel
//! is opaque iff its alpha is 255.
//!
//! ## Algorithms
//! - **Iterative averaging**: blends opaque 4-neighbors ring by ring.
//! - **Jump flood**: nearest opaque pixel in a logarithmic number of passes,
//!   parallelized over row ranges with Rayon.
//!
//! ```no_run
//! use ndarray::Array3;
//! use uvpad_rust::{pad_rgba, PadOptions};
//!
//! let texture = Array3::<u8>::zeros((256, 256, 4));
//! let padded = pad_rgba(texture.view(), &PadOptions::default())?;
//! assert_eq!(padded.image.dim(), (256, 256, 4));
//! # Ok::<(), uvpad_rust::PadError>(())
//! ```

pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{PadError, PadResult};
pub use filters::core::{opaque_mask, PadProgress, PaddedImage};
pub use filters::padding::{
    pad_rgba, pad_rgba_with_progress, Algorithm, IterativeAverage, JumpFlood, PadAlgorithm,
    PadOptions,
};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::filters::core::opaque_mask;
    use crate::filters::padding::{pad_rgba, Algorithm, PadOptions};
    use crate::PadError;

    fn to_py_err(err: PadError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    // ========================================================================
    // UV Padding
    // ========================================================================

    /// Fill transparent pixels of an RGBA u8 image from the nearest opaque pixels.
    ///
    /// # Arguments
    /// * `image` - Input image (height, width, 4)
    /// * `algorithm` - "jump_flood" (default) or "iterative"
    /// * `threads` - Jump flood worker count (default: automatic)
    #[pyfunction]
    #[pyo3(signature = (image, algorithm="jump_flood", threads=None))]
    pub fn uv_pad_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        algorithm: &str,
        threads: Option<usize>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let options = PadOptions {
            algorithm: algorithm.parse::<Algorithm>().map_err(to_py_err)?,
            threads,
        };
        let input = image.as_array();
        let result = pad_rgba(input, &options).map_err(to_py_err)?;
        Ok(result.image.into_pyarray(py))
    }

    /// Count fully opaque pixels of an RGBA u8 image.
    #[pyfunction]
    pub fn count_opaque<'py>(image: PyReadonlyArray3<'py, u8>) -> PyResult<usize> {
        let input = image.as_array();
        crate::filters::core::check_rgba(&input).map_err(to_py_err)?;
        Ok(opaque_mask(input).iter().filter(|&&m| m).count())
    }

    #[pymodule]
    pub fn uvpad_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(uv_pad_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(count_opaque, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::uvpad_rust;
