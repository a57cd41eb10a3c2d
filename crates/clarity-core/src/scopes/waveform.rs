//! Waveform and RGB parade tables.
//!
//! Each image row gets a 256-bin histogram of one channel. The whole table is
//! normalized by its single largest bin. Plotted as an intensity-weighted
//! scatter: row → vertical position, bin → horizontal position.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::image::PixelBuffer;
use crate::scopes::histogram::{CHANNEL_BINS, luma_bin};

/// Plot points dimmer than this are dropped.
pub const PLOT_THRESHOLD: f32 = 0.01;

/// Which value a waveform bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveformChannel {
    Luma,
    Red,
    Green,
    Blue,
}

impl WaveformChannel {
    fn bin(self, px: [u8; 4]) -> usize {
        match self {
            Self::Luma => luma_bin([px[0] as f32, px[1] as f32, px[2] as f32]),
            Self::Red => px[0] as usize,
            Self::Green => px[1] as usize,
            Self::Blue => px[2] as usize,
        }
    }
}

/// Per-row intensity histograms, row-major, `rows × 256`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformTable {
    pub channel: WaveformChannel,
    pub rows: u32,
    pub bins: Vec<f32>,
}

/// One point of a waveform plot, coordinates normalized to `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformPoint {
    /// Horizontal position, `bin / 255`.
    pub x: f32,
    /// Vertical position, `row / rows`.
    pub y: f32,
    pub intensity: f32,
}

impl WaveformTable {
    /// Normalized value of `bin` in `row`.
    pub fn get(&self, row: u32, bin: usize) -> f32 {
        self.bins[row as usize * CHANNEL_BINS + bin]
    }

    pub fn row(&self, row: u32) -> &[f32] {
        let start = row as usize * CHANNEL_BINS;
        &self.bins[start..start + CHANNEL_BINS]
    }

    /// Points to plot, sampling at most `row_budget` rows.
    pub fn plot_points(&self, row_budget: u32) -> Vec<WaveformPoint> {
        if self.rows == 0 {
            return Vec::new();
        }
        let step = self.rows.div_ceil(row_budget.max(1)).max(1);
        let rows = self.rows as f32;
        (0..self.rows)
            .step_by(step as usize)
            .flat_map(|row| {
                self.row(row)
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v > PLOT_THRESHOLD)
                    .map(move |(bin, &intensity)| WaveformPoint {
                        x: bin as f32 / 255.0,
                        y: row as f32 / rows,
                        intensity,
                    })
            })
            .collect()
    }
}

/// Compute a waveform table for `channel`.
pub fn compute(buffer: &PixelBuffer, channel: WaveformChannel) -> WaveformTable {
    let rows = buffer.height;
    let width = buffer.width as usize;
    let mut counts = vec![0u32; rows as usize * CHANNEL_BINS];

    if width > 0 {
        counts
            .par_chunks_mut(CHANNEL_BINS)
            .zip(buffer.pixels.par_chunks(width))
            .for_each(|(hist, row)| {
                for &px in row {
                    hist[channel.bin(px)] += 1;
                }
            });
    }

    let max = counts.iter().copied().max().unwrap_or(0);
    let bins = counts
        .iter()
        .map(|&c| if max > 0 { c as f32 / max as f32 } else { 0.0 })
        .collect();

    WaveformTable {
        channel,
        rows,
        bins,
    }
}

/// Separate waveforms for R, G, and B, displayed side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parade {
    pub red: WaveformTable,
    pub green: WaveformTable,
    pub blue: WaveformTable,
}

/// Compute an RGB parade. Each channel is normalized independently.
pub fn compute_parade(buffer: &PixelBuffer) -> Parade {
    Parade {
        red: compute(buffer, WaveformChannel::Red),
        green: compute(buffer, WaveformChannel::Green),
        blue: compute(buffer, WaveformChannel::Blue),
    }
}
