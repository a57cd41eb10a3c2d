//! Unsharp-mask sharpening.
//!
//! # Algorithm
//! A square Gaussian kernel of odd side `max(3, 2⌈2r⌉ + 1)` with `σ = r/2`,
//! normalized to sum to 1, blurs the input. Samples outside the image are
//! dropped from the weighted sum (no mirroring, no renormalization). Then per
//! channel:
//! ```text
//! out = clamp(original + amount/100 × (original − blurred))
//! ```
//! Alpha passes through unchanged.
//!
//! The 2D kernel is the outer product of a normalized 1D kernel, so the blur
//! runs as a horizontal pass followed by a vertical pass. Dropping
//! out-of-bounds taps in each pass drops exactly the same products as the 2D
//! form.
//!
//! # Complexity
//! O(W × H × K) instead of O(W × H × K²).

use rayon::prelude::*;

use crate::image::PixelBuffer;

/// Side length of the square blur kernel for `radius`.
pub fn kernel_size(radius: f32) -> usize {
    let half = (radius * 2.0).ceil().max(0.0) as usize;
    (2 * half + 1).max(3)
}

/// Normalized 1D Gaussian weights for `radius`.
///
/// The 2D kernel `k[y][x] = w[y] × w[x]` sums to 1.
pub fn gaussian_kernel_1d(radius: f32) -> Vec<f32> {
    let size = kernel_size(radius);
    let center = (size / 2) as f32;
    let sigma = radius / 2.0;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Gaussian blur of the RGB channels, rounded to bytes. Alpha is copied.
pub fn gaussian_blur(src: &PixelBuffer, radius: f32) -> PixelBuffer {
    if src.is_empty() || radius <= 0.0 {
        return src.clone();
    }
    let kernel = gaussian_kernel_1d(radius);
    let half = (kernel.len() / 2) as isize;
    let width = src.width as usize;
    let height = src.height as usize;

    // Horizontal pass into an f32 scratch buffer
    let mut horizontal = vec![[0.0f32; 3]; width * height];
    horizontal
        .par_chunks_mut(width)
        .zip(src.pixels.par_chunks(width))
        .for_each(|(out_row, in_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut acc = [0.0f32; 3];
                for (k, w) in kernel.iter().enumerate() {
                    let px = x as isize + k as isize - half;
                    if px < 0 || px >= width as isize {
                        continue;
                    }
                    let p = in_row[px as usize];
                    for c in 0..3 {
                        acc[c] += p[c] as f32 * w;
                    }
                }
                *out = acc;
            }
        });

    // Vertical pass, reading only the horizontal result
    let mut pixels = vec![[0u8; 4]; width * height];
    pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut acc = [0.0f32; 3];
                for (k, w) in kernel.iter().enumerate() {
                    let py = y as isize + k as isize - half;
                    if py < 0 || py >= height as isize {
                        continue;
                    }
                    let p = horizontal[py as usize * width + x];
                    for c in 0..3 {
                        acc[c] += p[c] * w;
                    }
                }
                let alpha = src.pixels[y * width + x][3];
                *out = [
                    to_byte(acc[0]),
                    to_byte(acc[1]),
                    to_byte(acc[2]),
                    alpha,
                ];
            }
        });

    PixelBuffer {
        width: src.width,
        height: src.height,
        pixels,
    }
}

/// Sharpen with an unsharp mask. `amount` is `0..=100`, `radius` in pixels.
///
/// `amount == 0` or `radius <= 0` returns an unchanged copy.
pub fn sharpen(src: &PixelBuffer, amount: f32, radius: f32) -> PixelBuffer {
    if amount == 0.0 || radius <= 0.0 || src.is_empty() {
        return src.clone();
    }
    let blurred = gaussian_blur(src, radius);
    let intensity = amount / 100.0;

    let pixels = src
        .pixels
        .par_iter()
        .zip(blurred.pixels.par_iter())
        .map(|(orig, blur)| {
            let mut out = *orig;
            for c in 0..3 {
                let o = orig[c] as f32;
                out[c] = to_byte(o + intensity * (o - blur[c] as f32));
            }
            out
        })
        .collect();

    PixelBuffer {
        width: src.width,
        height: src.height,
        pixels,
    }
}

fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
