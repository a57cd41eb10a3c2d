//! Spatial filters and post effects applied after the per-pixel stages.
//!
//! Sharpening reads only from its input buffer. Grain and vignette run last,
//! in place, on the sharpened result.

pub mod grain;
pub mod sharpen;
pub mod vignette;

pub use grain::apply_grain;
pub use sharpen::sharpen;
pub use vignette::apply_vignette;
