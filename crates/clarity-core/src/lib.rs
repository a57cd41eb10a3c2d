//! Clarity Core: pixel transform pipeline and analysis engine for
//! non-destructive photo grading.
//!
//! This crate holds the color math, the per-pixel adjustment chain, 3D LUT
//! sampling, spatial filters and scope computation. It never decodes or
//! encodes image containers; callers hand it [`PixelBuffer`]s.

pub mod color;
pub mod config;
pub mod error;
pub mod filters;
pub mod grading;
pub mod image;
pub mod pipeline;
pub mod scheduler;
pub mod scopes;
pub mod simulation;
pub mod transform;

// Re-exports for convenience.
pub use config::EngineConfig;
pub use error::{CatalogError, DimensionError, EngineError, FormatError};
pub use image::PixelBuffer;
pub use pipeline::{
    RenderOptions, render, render_export, render_for_analysis, render_preview, render_with,
};
pub use scheduler::{CancelToken, GradingSession, LatestOnly};
pub use scopes::{AnalysisReport, analyze, analyze_with};
pub use simulation::{Simulation, SimulationCatalog, SimulationDef};
pub use transform::evaluate::{PreparedAdjustments, evaluate_transform};
pub use transform::lut::Lut3D;
pub use transform::params::{AdjustmentOverrides, AdjustmentParams, HslAdjustment, HslShift};
