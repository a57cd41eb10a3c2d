//! Radial vignette.
//!
//! ```text
//! dx, dy   = offset from center / (width, height)
//! norm     = sqrt(dx² + dy²) / (size × 0.5)
//! factor   = 1 − min(1, norm)^(roundness × 2 + 0.5) × amount/100
//! ```
//! Every channel is multiplied by `factor` and clamped. The center pixel is
//! never darkened.

use rayon::prelude::*;

use crate::image::PixelBuffer;
use crate::transform::params::VignetteParams;

/// Darkening multiplier at normalized offset `(dx, dy)` from the center.
pub fn vignette_factor(dx: f32, dy: f32, params: &VignetteParams) -> f32 {
    let dist = (dx * dx + dy * dy).sqrt();
    let norm = if params.size > 0.0 {
        dist / (params.size * 0.5)
    } else if dist > 0.0 {
        1.0
    } else {
        0.0
    };
    let exponent = params.roundness.clamp(0.0, 1.0) * 2.0 + 0.5;
    1.0 - norm.min(1.0).powf(exponent) * (params.amount / 100.0)
}

/// Apply the vignette in place. Inactive parameters leave the buffer untouched.
pub fn apply_vignette(buffer: &mut PixelBuffer, params: &VignetteParams) {
    if !params.is_active() || buffer.is_empty() {
        return;
    }
    let width = buffer.width as usize;
    let (w, h) = (buffer.width as f32, buffer.height as f32);
    let (cx, cy) = (w / 2.0, h / 2.0);

    buffer
        .pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = (y as f32 - cy) / h;
            for (x, px) in row.iter_mut().enumerate() {
                let dx = (x as f32 - cx) / w;
                let factor = vignette_factor(dx, dy, params);
                for c in 0..3 {
                    px[c] = (px[c] as f32 * factor).round().clamp(0.0, 255.0) as u8;
                }
            }
        });
}
