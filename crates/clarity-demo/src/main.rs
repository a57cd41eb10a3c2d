//! Clarity Demo: render a photo through the grading pipeline from the
//! command line.
//!
//! Decodes an image, applies an adjustment snapshot plus an optional LUT or
//! film simulation, writes the result, and optionally dumps the scope
//! analysis as JSON.

mod config;
mod image_loader;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use clarity_core::{
    AdjustmentParams, EngineConfig, Lut3D, SimulationCatalog, analyze, render_export,
    render_for_analysis, render_preview,
};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::image_loader::{load_image, save_image};

#[derive(Parser)]
#[command(name = "clarity-demo")]
#[command(version, about = "Render a photo through the clarity grading pipeline")]
#[command(long_about = "
Render a photo through the clarity grading pipeline.

Examples:
  clarity-demo in.jpg out.png --params look.json
  clarity-demo in.jpg out.jpg --lut film.cube --preview
  clarity-demo in.jpg out.png --catalog luts/ --simulation velvia --analysis scopes.json
")]
struct Cli {
    /// Source image
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Rendered image (format follows the extension unless CLARITY_EXPORT_FORMAT is set)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Adjustment snapshot as JSON; missing fields keep their neutral value
    #[arg(short, long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// 3D LUT in .cube format
    #[arg(short, long, value_name = "FILE", conflicts_with = "simulation")]
    lut: Option<PathBuf>,

    /// Directory of simulation .cube files and an optional simulations.json
    #[arg(long, value_name = "DIR", requires = "simulation")]
    catalog: Option<PathBuf>,

    /// Simulation id to apply from the catalog
    #[arg(long, value_name = "ID", requires = "catalog")]
    simulation: Option<String>,

    /// Render at preview resolution instead of full resolution
    #[arg(long)]
    preview: bool,

    /// Grain seed, for reproducible output
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Write the scope analysis report as JSON
    #[arg(long, value_name = "FILE")]
    analysis: Option<PathBuf>,

    /// Engine configuration as JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let app_config = AppConfig::default();
    let engine_config = load_engine_config(cli.config.as_deref())?;
    let mut params = load_params(cli.params.as_deref())?;

    let mut lut = match &cli.lut {
        Some(path) => Some(
            Lut3D::load_cube(path)
                .with_context(|| format!("failed to load LUT {}", path.display()))?,
        ),
        None => None,
    };

    if let (Some(dir), Some(id)) = (&cli.catalog, &cli.simulation) {
        let catalog = SimulationCatalog::load(dir, engine_config.lut_identity_tolerance)
            .with_context(|| format!("failed to load simulation catalog {}", dir.display()))?;
        let Some(simulation) = catalog.get(id) else {
            let available: Vec<_> = catalog.ids().collect();
            bail!("simulation {id:?} is not available (loaded: {})", available.join(", "));
        };
        tracing::info!(id, name = %simulation.def.name, "applying simulation");
        params = simulation.params(&params);
        lut = simulation.lut.clone();
    }

    let start = Instant::now();
    let source = load_image(&cli.input)
        .with_context(|| format!("failed to load image {}", cli.input.display()))?;
    tracing::info!(
        path = %cli.input.display(),
        width = source.width,
        height = source.height,
        "loaded source"
    );

    let rendered = if cli.preview {
        render_preview(&source, &params, lut.as_ref(), &engine_config, cli.seed)?
    } else {
        render_export(&source, &params, lut.as_ref(), &engine_config, cli.seed)?
    };

    let format = app_config.format_for(&cli.output);
    save_image(&rendered, &cli.output, format, app_config.jpeg_quality)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    tracing::info!(
        path = %cli.output.display(),
        width = rendered.width,
        height = rendered.height,
        ?format,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote render"
    );

    if let Some(path) = &cli.analysis {
        let for_analysis = render_for_analysis(&source, &params, lut.as_ref(), &engine_config)?;
        let report = analyze(&for_analysis, &engine_config);
        let writer = BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        );
        serde_json::to_writer_pretty(writer, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote analysis report");
    }

    Ok(())
}

fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    EngineConfig::from_json(&text)
        .with_context(|| format!("invalid engine config {}", path.display()))
}

fn load_params(path: Option<&Path>) -> Result<AdjustmentParams> {
    let Some(path) = path else {
        return Ok(AdjustmentParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid adjustment params {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lut_conflicts_with_simulation() {
        let parsed = Cli::try_parse_from([
            "clarity-demo",
            "in.png",
            "out.png",
            "--lut",
            "a.cube",
            "--catalog",
            "luts",
            "--simulation",
            "velvia",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_params_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let json = r#"{"exposure": 0.5, "hsl": {"mode": "global", "hue": 10}}"#;
        std::fs::write(&path, json).unwrap();
        let params = load_params(Some(&path)).unwrap();
        assert_eq!(params.exposure, 0.5);
        assert_eq!(params.temperature, 5500.0);
        assert_eq!(params.hsl.global().hue, 10.0);
    }
}
