//! WebAssembly exports for UV padding.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//! Browsers run them on the calling thread, so jump flooding always uses a
//! single worker here.

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::filters::padding::{pad_rgba, Algorithm, PadOptions};

// ============================================================================
// UV Padding - u8 (8-bit)
// ============================================================================

/// Fill transparent pixels with colors from the nearest opaque pixels.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `slower` - Use iterative averaging instead of jump flooding
///
/// # Returns
/// Flat array of padded RGBA bytes
#[wasm_bindgen]
pub fn uv_pad_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    slower: bool,
) -> Result<Vec<u8>, JsValue> {
    let input = Array3::from_shape_vec((height, width, 4), data.to_vec())
        .map_err(|e| JsValue::from_str(&format!("invalid dimensions: {e}")))?;

    let options = PadOptions {
        algorithm: if slower {
            Algorithm::IterativeAverage
        } else {
            Algorithm::JumpFlood
        },
        threads: Some(1),
    };
    let result = pad_rgba(input.view(), &options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(result.image.into_raw_vec_and_offset().0)
}
