//! Vectorscope (hue × saturation) density computation.
//!
//! Each pixel is converted to HSV and counted in a 360 × 101 table indexed by
//! rounded hue degree and rounded saturation percent. Plotted in polar form:
//! angle follows hue, radius follows saturation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::hsl::rgb_to_hsv;
use crate::image::PixelBuffer;
use crate::scopes::histogram::{HUE_BINS, SATURATION_BINS};

/// Vectorscope density table, row-major by hue: `hue × 101 + saturation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorscopeField {
    /// Normalized density; the fullest cell reads 1.0.
    pub density: Vec<f32>,
}

/// One plotted cell in polar form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// Hue in degrees.
    pub angle: f32,
    /// Saturation, `0..=1` of the scope radius.
    pub radius: f32,
    /// Plot opacity, `min(1, 10 × density)`.
    pub alpha: f32,
}

impl VectorscopeField {
    pub fn get(&self, hue: usize, saturation: usize) -> f32 {
        self.density[hue * SATURATION_BINS + saturation]
    }

    /// Non-empty cells as polar plot points.
    pub fn plot_points(&self) -> Vec<PolarPoint> {
        self.density
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > 0.0)
            .map(|(i, &d)| PolarPoint {
                angle: (i / SATURATION_BINS) as f32,
                radius: (i % SATURATION_BINS) as f32 / 100.0,
                alpha: (d * 10.0).min(1.0),
            })
            .collect()
    }
}

fn cell(px: [u8; 4]) -> usize {
    let (h, s, _) = rgb_to_hsv([px[0], px[1], px[2]].map(|c| c as f32 / 255.0));
    let hue = h.round() as usize % HUE_BINS;
    let sat = ((s * 100.0).round() as usize).min(SATURATION_BINS - 1);
    hue * SATURATION_BINS + sat
}

/// Compute the vectorscope field of a rendered buffer.
pub fn compute(buffer: &PixelBuffer) -> VectorscopeField {
    let total = HUE_BINS * SATURATION_BINS;
    let counts = buffer
        .pixels
        .par_chunks(4096)
        .fold(
            || vec![0u32; total],
            |mut acc, chunk| {
                for &px in chunk {
                    acc[cell(px)] += 1;
                }
                acc
            },
        )
        .reduce(
            || vec![0u32; total],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );

    let max = counts.iter().copied().max().unwrap_or(0);
    let density = counts
        .iter()
        .map(|&c| if max > 0 { c as f32 / max as f32 } else { 0.0 })
        .collect();
    VectorscopeField { density }
}
