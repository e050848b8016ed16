//! Padding filters for RGBA textures.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255 |
//!
//! A pixel is opaque only when its alpha is 255. Everything else, including
//! partially transparent pixels, is overwritten by the padding.
//!
//! ## Algorithms
//!
//! - **Iterative averaging** ([`iterative`]) - grows the opaque region one
//!   ring per pass, blending 4-connected neighbors. Cost grows with the
//!   widest transparent gap.
//! - **Jump flood** ([`jump_flood`]) - nearest opaque pixel search in
//!   `2 * ceil(log2(max(W, H)))` passes, parallelized with Rayon.
//!
//! Both are selected through [`padding::PadOptions`].

pub mod core;
pub mod iterative;
pub mod jump_flood;
pub mod padding;
