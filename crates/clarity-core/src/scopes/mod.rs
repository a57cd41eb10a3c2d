//! Scope computation: histograms, waveforms, vectorscope, entropy map and
//! RGB scatter.
//!
//! Every artifact is derived wholesale from a rendered buffer and holds no
//! reference back to it.

pub mod entropy;
pub mod histogram;
pub mod scatter;
pub mod vectorscope;
pub mod waveform;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::image::PixelBuffer;
use crate::scheduler::CancelToken;

pub use entropy::EntropyMap;
pub use histogram::HistogramSet;
pub use scatter::ScatterSample;
pub use vectorscope::{PolarPoint, VectorscopeField};
pub use waveform::{Parade, WaveformChannel, WaveformPoint, WaveformTable};

/// Everything the scope panels display for one rendered buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub width: u32,
    pub height: u32,
    pub histograms: HistogramSet,
    pub luma_waveform: WaveformTable,
    /// Luma waveform plot, sampled to at most
    /// [`EngineConfig::waveform_row_budget`] rows.
    pub waveform_points: Vec<WaveformPoint>,
    pub parade: Parade,
    pub vectorscope: VectorscopeField,
    pub vectorscope_points: Vec<PolarPoint>,
    pub entropy: EntropyMap,
    pub scatter: ScatterSample,
}

/// Compute every scope for `buffer`.
///
/// The buffer is downscaled to [`EngineConfig::analysis_max_dimension`]
/// first when it is larger.
pub fn analyze(buffer: &PixelBuffer, config: &EngineConfig) -> AnalysisReport {
    let working = buffer.downscaled(config.analysis_max_dimension);
    compute_all(&working, config)
}

/// Cancellable form of [`analyze`].
///
/// Returns `None` when `token` is cancelled before the scopes start or
/// before they are handed back.
pub fn analyze_with(
    buffer: &PixelBuffer,
    config: &EngineConfig,
    token: &CancelToken,
) -> Option<AnalysisReport> {
    if token.is_cancelled() {
        return None;
    }
    let report = analyze(buffer, config);
    (!token.is_cancelled()).then_some(report)
}

fn compute_all(buffer: &PixelBuffer, config: &EngineConfig) -> AnalysisReport {
    let histograms = histogram::compute(buffer);
    let luma_waveform = waveform::compute(buffer, WaveformChannel::Luma);
    let parade = waveform::compute_parade(buffer);
    let waveform_points = luma_waveform.plot_points(config.waveform_row_budget);
    let vectorscope = vectorscope::compute(buffer);
    let vectorscope_points = vectorscope.plot_points();
    let entropy = entropy::compute(buffer, config.entropy_block_size);
    let scatter = scatter::compute(buffer, config.scatter_budget);

    tracing::debug!(
        width = buffer.width,
        height = buffer.height,
        waveform_points = waveform_points.len(),
        scatter_points = scatter.points.len(),
        entropy_blocks = entropy.entropies.len(),
        "analysis complete"
    );

    AnalysisReport {
        width: buffer.width,
        height: buffer.height,
        histograms,
        luma_waveform,
        waveform_points,
        parade,
        vectorscope,
        vectorscope_points,
        entropy,
        scatter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_downscales_large_buffers() {
        let buf = PixelBuffer::filled(1000, 500, [40, 80, 120, 255]);
        let config = EngineConfig {
            analysis_max_dimension: 100,
            ..EngineConfig::default()
        };
        let report = analyze(&buf, &config);
        assert_eq!((report.width, report.height), (100, 50));
        assert_eq!(report.luma_waveform.rows, 50);
        assert_eq!(report.histograms.red.len(), 256);
        assert_eq!(report.histograms.red[40], 1.0);
    }

    #[test]
    fn test_analyze_uses_configured_budgets() {
        let buf = PixelBuffer::filled(64, 64, [10, 20, 30, 255]);
        let config = EngineConfig {
            entropy_block_size: 16,
            scatter_budget: 100,
            ..EngineConfig::default()
        };
        let report = analyze(&buf, &config);
        assert_eq!(report.entropy.entropies.len(), 16);
        assert!(report.scatter.points.len() <= 100);
    }

    #[test]
    fn test_waveform_row_budget_bounds_plotted_rows() {
        // Each row holds one gray level, so every row plots exactly one point.
        let width = 4u32;
        let height = 90u32;
        let pixels = (0..height)
            .flat_map(|y| {
                let v = (y * 2) as u8;
                std::iter::repeat_n([v, v, v, 255], width as usize)
            })
            .collect();
        let buf = PixelBuffer::new(width, height, pixels).unwrap();
        let config = EngineConfig {
            waveform_row_budget: 10,
            ..EngineConfig::default()
        };
        let report = analyze(&buf, &config);

        let mut rows: Vec<u32> = report
            .waveform_points
            .iter()
            .map(|p| (p.y * height as f32).round() as u32)
            .collect();
        rows.dedup();
        assert_eq!(rows.len(), 10);
        assert_eq!(report.waveform_points.len(), 10);

        let unbounded = analyze(
            &buf,
            &EngineConfig {
                waveform_row_budget: 1000,
                ..EngineConfig::default()
            },
        );
        assert_eq!(unbounded.waveform_points.len(), height as usize);
    }

    #[test]
    fn test_vectorscope_points_are_reported() {
        let buf = PixelBuffer::filled(8, 8, [255, 0, 0, 255]);
        let report = analyze(&buf, &EngineConfig::default());
        assert_eq!(report.vectorscope_points.len(), 1);
        let point = report.vectorscope_points[0];
        assert_eq!(point.angle, 0.0);
        assert_eq!(point.radius, 1.0);
        assert_eq!(point.alpha, 1.0);
    }

    #[test]
    fn test_cancelled_analysis_returns_none() {
        let slot: crate::scheduler::LatestOnly<()> = crate::scheduler::LatestOnly::new("test");
        let token = slot.begin();
        slot.begin();
        let buf = PixelBuffer::filled(4, 4, [1, 2, 3, 255]);
        assert!(analyze_with(&buf, &EngineConfig::default(), &token).is_none());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let buf = PixelBuffer::filled(8, 8, [200, 100, 50, 255]);
        let report = analyze(&buf, &EngineConfig::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["width"], 8);
        assert_eq!(json["luma_waveform"]["channel"], "luma");
    }
}
