//! Block entropy map.
//!
//! The image is split into square blocks; only whole blocks are measured.
//! Each block's grayscale `(R + G + B) / 3` values feed a 256-bin histogram
//! whose Shannon entropy (bits) is recorded. The entropies are then binned
//! into 100 bins by `round(e / max_e × 99)` and normalized by the fullest bin.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::image::PixelBuffer;

pub const ENTROPY_BINS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyMap {
    pub block_size: u32,
    pub blocks_x: u32,
    pub blocks_y: u32,
    /// Entropy of each block in bits, row-major.
    pub entropies: Vec<f32>,
    /// Normalized distribution of block entropies.
    pub histogram: Vec<f32>,
}

/// Shannon entropy in bits of a 256-bin histogram holding `total` samples.
pub fn shannon_entropy(histogram: &[u32; 256], total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f32;
    histogram
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f32 / total;
            -p * p.log2()
        })
        .sum()
}

fn block_entropy(buffer: &PixelBuffer, bx: u32, by: u32, block: u32) -> f32 {
    let mut hist = [0u32; 256];
    for y in by * block..(by + 1) * block {
        for x in bx * block..(bx + 1) * block {
            let px = buffer.get(x, y);
            let gray = ((px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0).round() as usize;
            hist[gray.min(255)] += 1;
        }
    }
    shannon_entropy(&hist, block * block)
}

/// Compute the entropy map with square blocks of `block_size` pixels.
///
/// A zero block size is treated as 1.
pub fn compute(buffer: &PixelBuffer, block_size: u32) -> EntropyMap {
    let block = block_size.max(1);
    let blocks_x = buffer.width / block;
    let blocks_y = buffer.height / block;

    let entropies: Vec<f32> = (0..blocks_x * blocks_y)
        .into_par_iter()
        .map(|i| block_entropy(buffer, i % blocks_x, i / blocks_x, block))
        .collect();

    let mut counts = vec![0u32; ENTROPY_BINS];
    let max_entropy = entropies.iter().copied().fold(0.0f32, f32::max);
    for &e in &entropies {
        let bin = if max_entropy > 0.0 {
            ((e / max_entropy * 99.0).round() as usize).min(ENTROPY_BINS - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }
    let peak = counts.iter().copied().max().unwrap_or(0);
    let histogram = counts
        .iter()
        .map(|&c| if peak > 0 { c as f32 / peak as f32 } else { 0.0 })
        .collect();

    EntropyMap {
        block_size: block,
        blocks_x,
        blocks_y,
        entropies,
        histogram,
    }
}
