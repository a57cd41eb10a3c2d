//! Achromatic film grain.
//!
//! Each pixel gets one uniform sample in `[-amount, amount] × 255` (amount
//! normalized to `0..=1`), added equally to R, G, and B. Every pixel draws a
//! fresh sample.
//!
//! Randomness comes from an explicit seed. Each row owns an RNG stream derived
//! from the seed and the row index, so parallel and sequential runs with the
//! same seed produce the same image.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::image::PixelBuffer;

/// Odd 64-bit constant (2⁶⁴/φ) used to spread row indices across seeds.
const ROW_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for the RNG stream of row `y`.
fn row_seed(seed: u64, y: usize) -> u64 {
    seed ^ (y as u64 + 1).wrapping_mul(ROW_SEED_MIX)
}

/// Add grain in place. `amount` is `0..=100`; zero leaves the buffer untouched.
pub fn apply_grain(buffer: &mut PixelBuffer, amount: f32, seed: u64) {
    if amount <= 0.0 || buffer.is_empty() {
        return;
    }
    let strength = (amount / 100.0).min(1.0) * 255.0;
    let width = buffer.width as usize;

    buffer
        .pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, y));
            for px in row.iter_mut() {
                let noise = rng.gen_range(-1.0f32..=1.0) * strength;
                for c in 0..3 {
                    px[c] = (px[c] as f32 + noise).round().clamp(0.0, 255.0) as u8;
                }
            }
        });
}
