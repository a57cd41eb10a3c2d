//! Engine configuration: resolution bounds and analysis budgets.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::transform::lut::IDENTITY_TOLERANCE;

/// Default long-edge bound for interactive preview renders.
const DEFAULT_PREVIEW_MAX: u32 = 800;
/// Default long-edge bound for analysis renders.
const DEFAULT_ANALYSIS_MAX: u32 = 800;
/// Default entropy block side.
const DEFAULT_ENTROPY_BLOCK: u32 = 8;
/// Default scatter point budget.
const DEFAULT_SCATTER_BUDGET: usize = 10_000;
/// Default number of waveform rows turned into plot points.
const DEFAULT_WAVEFORM_ROWS: u32 = 400;

/// Runtime configuration for the grading engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Long edge of preview renders, in pixels.
    pub preview_max_dimension: u32,
    /// Long edge of buffers fed to the analysis engine, in pixels.
    pub analysis_max_dimension: u32,
    /// Side of the square blocks in the entropy map.
    pub entropy_block_size: u32,
    /// Upper bound on scatter points.
    pub scatter_budget: usize,
    /// Upper bound on waveform rows emitted as plot points.
    pub waveform_row_budget: u32,
    /// Per-channel tolerance when deciding whether a LUT is an identity.
    pub lut_identity_tolerance: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview_max_dimension: env_or("CLARITY_PREVIEW_MAX", DEFAULT_PREVIEW_MAX),
            analysis_max_dimension: env_or("CLARITY_ANALYSIS_MAX", DEFAULT_ANALYSIS_MAX),
            entropy_block_size: env_or("CLARITY_ENTROPY_BLOCK", DEFAULT_ENTROPY_BLOCK),
            scatter_budget: env_or("CLARITY_SCATTER_BUDGET", DEFAULT_SCATTER_BUDGET),
            waveform_row_budget: DEFAULT_WAVEFORM_ROWS,
            lut_identity_tolerance: IDENTITY_TOLERANCE,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
