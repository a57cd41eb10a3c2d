//! RGB, luminance, and HSV histograms.
//!
//! Bins are normalized by group: R, G, B, and luminance share one maximum;
//! hue, saturation, and value share another. The fullest bin of each group
//! reads exactly 1.0.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::hsl::rgb_to_hsv;
use crate::color::luma;
use crate::image::PixelBuffer;

pub const CHANNEL_BINS: usize = 256;
pub const HUE_BINS: usize = 360;
pub const SATURATION_BINS: usize = 101;

/// Normalized histograms of a rendered buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSet {
    pub red: Vec<f32>,
    pub green: Vec<f32>,
    pub blue: Vec<f32>,
    pub luminance: Vec<f32>,
    /// One bin per degree.
    pub hue: Vec<f32>,
    /// One bin per percent, `0..=100`.
    pub saturation: Vec<f32>,
    pub value: Vec<f32>,
}

/// Raw bin counts, merged across parallel chunks.
#[derive(Debug, Clone)]
struct Counts {
    red: Vec<u32>,
    green: Vec<u32>,
    blue: Vec<u32>,
    luminance: Vec<u32>,
    hue: Vec<u32>,
    saturation: Vec<u32>,
    value: Vec<u32>,
}

impl Counts {
    fn new() -> Self {
        Self {
            red: vec![0; CHANNEL_BINS],
            green: vec![0; CHANNEL_BINS],
            blue: vec![0; CHANNEL_BINS],
            luminance: vec![0; CHANNEL_BINS],
            hue: vec![0; HUE_BINS],
            saturation: vec![0; SATURATION_BINS],
            value: vec![0; CHANNEL_BINS],
        }
    }

    fn add(&mut self, px: [u8; 4]) {
        let rgb = [px[0] as f32, px[1] as f32, px[2] as f32];
        self.red[px[0] as usize] += 1;
        self.green[px[1] as usize] += 1;
        self.blue[px[2] as usize] += 1;
        self.luminance[luma_bin(rgb)] += 1;

        let (h, s, v) = rgb_to_hsv(rgb.map(|c| c / 255.0));
        self.hue[h.round() as usize % HUE_BINS] += 1;
        self.saturation[((s * 100.0).round() as usize).min(SATURATION_BINS - 1)] += 1;
        self.value[((v * 255.0).round() as usize).min(CHANNEL_BINS - 1)] += 1;
    }

    fn merge(mut self, other: Self) -> Self {
        for (dst, src) in [
            (&mut self.red, &other.red),
            (&mut self.green, &other.green),
            (&mut self.blue, &other.blue),
            (&mut self.luminance, &other.luminance),
            (&mut self.hue, &other.hue),
            (&mut self.saturation, &other.saturation),
            (&mut self.value, &other.value),
        ] {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
        self
    }
}

/// Luminance bin of a pixel with channels in `0..=255`.
pub fn luma_bin(rgb: [f32; 3]) -> usize {
    (luma(rgb).round() as usize).min(CHANNEL_BINS - 1)
}

/// Divide every bin of a group by the group's largest count.
fn normalize_group(group: &[&Vec<u32>]) -> Vec<Vec<f32>> {
    let max = group
        .iter()
        .flat_map(|bins| bins.iter().copied())
        .max()
        .unwrap_or(0);
    group
        .iter()
        .map(|bins| {
            bins.iter()
                .map(|&c| if max > 0 { c as f32 / max as f32 } else { 0.0 })
                .collect()
        })
        .collect()
}

/// Compute histograms from a rendered buffer.
pub fn compute(buffer: &PixelBuffer) -> HistogramSet {
    let counts = buffer
        .pixels
        .par_chunks(4096)
        .fold(Counts::new, |mut acc, chunk| {
            for &px in chunk {
                acc.add(px);
            }
            acc
        })
        .reduce(Counts::new, Counts::merge);

    let mut rgbl = normalize_group(&[
        &counts.red,
        &counts.green,
        &counts.blue,
        &counts.luminance,
    ])
    .into_iter();
    let mut hsv = normalize_group(&[&counts.hue, &counts.saturation, &counts.value]).into_iter();

    HistogramSet {
        red: rgbl.next().unwrap_or_default(),
        green: rgbl.next().unwrap_or_default(),
        blue: rgbl.next().unwrap_or_default(),
        luminance: rgbl.next().unwrap_or_default(),
        hue: hsv.next().unwrap_or_default(),
        saturation: hsv.next().unwrap_or_default(),
        value: hsv.next().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(pixels: Vec<[u8; 4]>) -> PixelBuffer {
        let n = pixels.len() as u32;
        PixelBuffer::new(n, 1, pixels).unwrap()
    }

    #[test]
    fn test_bin_lengths() {
        let hist = compute(&image(vec![[1, 2, 3, 255]]));
        assert_eq!(hist.red.len(), 256);
        assert_eq!(hist.luminance.len(), 256);
        assert_eq!(hist.hue.len(), 360);
        assert_eq!(hist.saturation.len(), 101);
        assert_eq!(hist.value.len(), 256);
    }

    #[test]
    fn test_peak_bin_is_exactly_one() {
        let mut pixels = vec![[10, 20, 30, 255]; 7];
        pixels.extend(vec![[200, 20, 90, 255]; 3]);
        let hist = compute(&image(pixels));

        let rgbl_max = [&hist.red, &hist.green, &hist.blue, &hist.luminance]
            .iter()
            .flat_map(|b| b.iter().copied())
            .fold(0.0f32, f32::max);
        assert_eq!(rgbl_max, 1.0);
        // Green has all 10 pixels in one bin; red's fullest bin holds 7.
        assert_eq!(hist.green[20], 1.0);
        assert_eq!(hist.red[10], 0.7);
        assert!(hist.red.iter().all(|&v| v <= 1.0));

        let hsv_max = [&hist.hue, &hist.saturation, &hist.value]
            .iter()
            .flat_map(|b| b.iter().copied())
            .fold(0.0f32, f32::max);
        assert_eq!(hsv_max, 1.0);
    }

    #[test]
    fn test_gray_pixels_land_in_hue_zero_and_saturation_zero() {
        let hist = compute(&image(vec![[128, 128, 128, 255]; 4]));
        assert_eq!(hist.hue[0], 1.0);
        assert_eq!(hist.saturation[0], 1.0);
        assert_eq!(hist.value[128], 1.0);
        assert_eq!(hist.luminance[128], 1.0);
    }

    #[test]
    fn test_primary_hues() {
        let hist = compute(&image(vec![
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
        ]));
        assert!(hist.hue[0] > 0.0);
        assert!(hist.hue[120] > 0.0);
        assert!(hist.hue[240] > 0.0);
        assert_eq!(hist.saturation[100], 1.0);
    }

    #[test]
    fn test_empty_buffer_is_all_zero() {
        let hist = compute(&PixelBuffer::filled(0, 0, [0; 4]));
        assert!(hist.red.iter().all(|&v| v == 0.0));
        assert!(hist.hue.iter().all(|&v| v == 0.0));
    }
}
