//! The render pipeline.
//!
//! One implementation serves preview, export and analysis:
//!
//! 1. Optional downscale to a bounded long edge
//! 2. Per-pixel stages ([`evaluate_transform`]), row-parallel
//! 3. Unsharp mask, reading only from the per-pixel output
//! 4. Grain and vignette, unless post effects are skipped
//!
//! The output always has the dimensions of the (possibly downscaled) input.

use std::borrow::Cow;
use std::time::Instant;

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::filters::{apply_grain, apply_vignette, sharpen};
use crate::image::PixelBuffer;
use crate::scheduler::CancelToken;
use crate::transform::evaluate::{PreparedAdjustments, evaluate_transform};
use crate::transform::lut::{IDENTITY_TOLERANCE, Lut3D};
use crate::transform::params::AdjustmentParams;

/// How one render is carried out. The adjustments themselves live in
/// [`AdjustmentParams`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Grain seed. `None` draws a fresh one per render.
    pub seed: Option<u64>,
    /// Skip grain and vignette. Used for analysis renders.
    pub skip_post_effects: bool,
    /// Bound on the long edge. `None` renders at source resolution.
    pub max_dimension: Option<u32>,
    /// LUTs within this tolerance of identity are not applied.
    pub lut_tolerance: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            seed: None,
            skip_post_effects: false,
            max_dimension: None,
            lut_tolerance: IDENTITY_TOLERANCE,
        }
    }
}

struct Cancelled;

/// Render `source` at full resolution with a fresh grain seed.
pub fn render(
    source: &PixelBuffer,
    params: &AdjustmentParams,
    lut: Option<&Lut3D>,
) -> Result<PixelBuffer, EngineError> {
    render_uncancellable(source, params, lut, &RenderOptions::default())
}

/// Render bounded by [`EngineConfig::preview_max_dimension`].
pub fn render_preview(
    source: &PixelBuffer,
    params: &AdjustmentParams,
    lut: Option<&Lut3D>,
    config: &EngineConfig,
    seed: Option<u64>,
) -> Result<PixelBuffer, EngineError> {
    let options = RenderOptions {
        seed,
        max_dimension: Some(config.preview_max_dimension),
        lut_tolerance: config.lut_identity_tolerance,
        ..RenderOptions::default()
    };
    render_uncancellable(source, params, lut, &options)
}

/// Render at source resolution with the same stages as a preview.
pub fn render_export(
    source: &PixelBuffer,
    params: &AdjustmentParams,
    lut: Option<&Lut3D>,
    config: &EngineConfig,
    seed: Option<u64>,
) -> Result<PixelBuffer, EngineError> {
    let options = RenderOptions {
        seed,
        lut_tolerance: config.lut_identity_tolerance,
        ..RenderOptions::default()
    };
    render_uncancellable(source, params, lut, &options)
}

/// Render bounded by [`EngineConfig::analysis_max_dimension`] without post
/// effects.
pub fn render_for_analysis(
    source: &PixelBuffer,
    params: &AdjustmentParams,
    lut: Option<&Lut3D>,
    config: &EngineConfig,
) -> Result<PixelBuffer, EngineError> {
    let token = CancelToken::never();
    let rendered = render_for_analysis_with(source, params, lut, config, &token)?;
    Ok(rendered.unwrap_or_else(|| source.clone()))
}

/// Cancellable form of [`render_for_analysis`].
pub fn render_for_analysis_with(
    source: &PixelBuffer,
    params: &AdjustmentParams,
    lut: Option<&Lut3D>,
    config: &EngineConfig,
    token: &CancelToken,
) -> Result<Option<PixelBuffer>, EngineError> {
    let options = analysis_options(config);
    render_with(source, params, lut, &options, token)
}

fn analysis_options(config: &EngineConfig) -> RenderOptions {
    RenderOptions {
        seed: Some(0),
        skip_post_effects: true,
        max_dimension: Some(config.analysis_max_dimension),
        lut_tolerance: config.lut_identity_tolerance,
    }
}

fn render_uncancellable(
    source: &PixelBuffer,
    params: &AdjustmentParams,
    lut: Option<&Lut3D>,
    options: &RenderOptions,
) -> Result<PixelBuffer, EngineError> {
    let token = CancelToken::never();
    // A token that is never cancelled always yields a buffer.
    Ok(render_with(source, params, lut, options, &token)?.unwrap_or_else(|| source.clone()))
}

/// Render with cancellation.
///
/// Returns `Ok(None)` when `token` is cancelled before the render finishes.
pub fn render_with(
    source: &PixelBuffer,
    params: &AdjustmentParams,
    lut: Option<&Lut3D>,
    options: &RenderOptions,
    token: &CancelToken,
) -> Result<Option<PixelBuffer>, EngineError> {
    let start = Instant::now();
    let working = match options.max_dimension {
        Some(max) => source.downscaled(max),
        None => Cow::Borrowed(source),
    };
    let prepared = PreparedAdjustments::new(params, lut, options.lut_tolerance);

    let Ok(mut out) = apply_pixel_stages(&working, &prepared, token) else {
        return Ok(None);
    };
    check_dimensions(&working, &out)?;

    if params.sharpen.is_active() {
        if token.is_cancelled() {
            return Ok(None);
        }
        out = sharpen(&out, params.sharpen.amount, params.sharpen.radius);
        check_dimensions(&working, &out)?;
    }

    if !options.skip_post_effects {
        if params.grain.is_active() {
            let seed = options.seed.unwrap_or_else(rand::random);
            apply_grain(&mut out, params.grain.amount, seed);
        }
        apply_vignette(&mut out, &params.vignette);
    }

    if token.is_cancelled() {
        return Ok(None);
    }

    tracing::debug!(
        width = out.width,
        height = out.height,
        stages = ?prepared.active_stages(),
        sharpen = params.sharpen.is_active(),
        post_effects = !options.skip_post_effects,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "render complete"
    );
    Ok(Some(out))
}

fn apply_pixel_stages(
    src: &PixelBuffer,
    prepared: &PreparedAdjustments<'_>,
    token: &CancelToken,
) -> Result<PixelBuffer, Cancelled> {
    if prepared.is_identity() || src.is_empty() {
        return Ok(src.clone());
    }

    let width = src.width as usize;
    let mut pixels = vec![[0u8; 4]; src.pixel_count()];
    pixels
        .par_chunks_mut(width)
        .zip(src.pixels.par_chunks(width))
        .try_for_each(|(dst, row)| {
            if token.is_cancelled() {
                return Err(Cancelled);
            }
            for (out, px) in dst.iter_mut().zip(row) {
                let rgb = evaluate_transform([px[0], px[1], px[2]].map(f32::from), prepared);
                let [r, g, b] = rgb.map(|c| c.round().clamp(0.0, 255.0) as u8);
                *out = [r, g, b, px[3]];
            }
            Ok(())
        })?;

    Ok(PixelBuffer {
        width: src.width,
        height: src.height,
        pixels,
    })
}

fn check_dimensions(expected: &PixelBuffer, found: &PixelBuffer) -> Result<(), EngineError> {
    expected.ensure_same_dimensions(found).map_err(|e| {
        tracing::error!(error = %e, "render stage changed buffer dimensions");
        EngineError::from(e)
    })
}
