//! Fixed-budget RGB scatter sample.
//!
//! Every `stride`-th pixel is kept, with `stride = ⌈n / budget⌉`, so at most
//! `budget` points come back. Points are projected onto the R–G plane and
//! carry their full RGB for coloring.

use serde::{Deserialize, Serialize};

use crate::image::PixelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Red, `0..=1`.
    pub x: f32,
    /// Green, `0..=1`.
    pub y: f32,
    pub rgb: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSample {
    pub stride: usize,
    pub points: Vec<ScatterPoint>,
}

pub fn compute(buffer: &PixelBuffer, budget: usize) -> ScatterSample {
    let stride = buffer.pixel_count().div_ceil(budget.max(1)).max(1);
    let points = buffer
        .pixels
        .iter()
        .step_by(stride)
        .map(|px| ScatterPoint {
            x: px[0] as f32 / 255.0,
            y: px[1] as f32 / 255.0,
            rgb: [px[0], px[1], px[2]],
        })
        .collect();
    ScatterSample { stride, points }
}
