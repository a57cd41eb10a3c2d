//! Last-snapshot-wins scheduling for interactive renders and analysis.
//!
//! Every submission bumps a generation counter. A computation holds a
//! [`CancelToken`] for the generation it started under and polls it between
//! rows; once a newer submission arrives the token reports cancelled and the
//! computation returns early. Results from a stale generation are never
//! published.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::image::PixelBuffer;
use crate::pipeline::{self, RenderOptions};
use crate::scopes::{self, AnalysisReport};
use crate::transform::lut::Lut3D;
use crate::transform::params::AdjustmentParams;

/// Observes whether a newer submission has superseded this one.
#[derive(Debug, Clone)]
pub struct CancelToken {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::Acquire) != self.generation
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

/// A slot holding the newest completed result of one kind of computation.
///
/// At most one computation runs at a time; a submission that arrives while
/// another is running cancels it and waits for the slot.
pub struct LatestOnly<T> {
    name: &'static str,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<()>,
    published: Mutex<Option<(u64, Arc<T>)>>,
}

impl<T> LatestOnly<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(()),
            published: Mutex::new(None),
        }
    }

    /// Start a new generation, cancelling every outstanding token.
    pub fn begin(&self) -> CancelToken {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        CancelToken {
            current: Arc::clone(&self.generation),
            generation,
        }
    }

    /// Run `compute` as the newest submission.
    ///
    /// Returns `Ok(None)` when the computation was superseded, either before
    /// it started, while it ran, or before its result could be published.
    pub fn run<E>(
        &self,
        compute: impl FnOnce(&CancelToken) -> Result<Option<T>, E>,
    ) -> Result<Option<Arc<T>>, E> {
        let token = self.begin();
        let _running = self.in_flight.lock();

        if token.is_cancelled() {
            tracing::debug!(
                slot = self.name,
                generation = token.generation,
                "skipping superseded submission"
            );
            return Ok(None);
        }

        let Some(value) = compute(&token)? else {
            tracing::debug!(
                slot = self.name,
                generation = token.generation,
                "discarding cancelled result"
            );
            return Ok(None);
        };

        let mut published = self.published.lock();
        if token.is_cancelled() {
            tracing::debug!(
                slot = self.name,
                generation = token.generation,
                "discarding stale result"
            );
            return Ok(None);
        }
        let value = Arc::new(value);
        *published = Some((token.generation, Arc::clone(&value)));
        Ok(Some(value))
    }

    /// The most recently published result.
    pub fn latest(&self) -> Option<Arc<T>> {
        self.published.lock().as_ref().map(|(_, v)| Arc::clone(v))
    }

    /// Generation of the most recently published result.
    pub fn latest_generation(&self) -> Option<u64> {
        self.published.lock().as_ref().map(|(g, _)| *g)
    }
}

/// One source image with its render and analysis slots.
///
/// The source is shared read-only by every render attempt; each render
/// produces its own output buffer.
pub struct GradingSession {
    source: Arc<PixelBuffer>,
    config: EngineConfig,
    render_slot: LatestOnly<PixelBuffer>,
    analysis_slot: LatestOnly<AnalysisReport>,
}

impl GradingSession {
    pub fn new(source: PixelBuffer, config: EngineConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            render_slot: LatestOnly::new("render"),
            analysis_slot: LatestOnly::new("analysis"),
        }
    }

    pub fn source(&self) -> &Arc<PixelBuffer> {
        &self.source
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render a preview for `params`. `Ok(None)` means a newer snapshot won.
    pub fn render_preview(
        &self,
        params: &AdjustmentParams,
        lut: Option<&Lut3D>,
        seed: u64,
    ) -> Result<Option<Arc<PixelBuffer>>, EngineError> {
        let options = RenderOptions {
            seed: Some(seed),
            max_dimension: Some(self.config.preview_max_dimension),
            lut_tolerance: self.config.lut_identity_tolerance,
            ..RenderOptions::default()
        };
        self.render_slot
            .run(|token| pipeline::render_with(&self.source, params, lut, &options, token))
    }

    /// Render for analysis and compute every scope. `Ok(None)` means a newer
    /// snapshot won.
    pub fn analyze(
        &self,
        params: &AdjustmentParams,
        lut: Option<&Lut3D>,
    ) -> Result<Option<Arc<AnalysisReport>>, EngineError> {
        self.analysis_slot.run(|token| {
            let Some(rendered) =
                pipeline::render_for_analysis_with(&self.source, params, lut, &self.config, token)?
            else {
                return Ok(None);
            };
            Ok(scopes::analyze_with(&rendered, &self.config, token))
        })
    }

    pub fn latest_render(&self) -> Option<Arc<PixelBuffer>> {
        self.render_slot.latest()
    }

    pub fn latest_analysis(&self) -> Option<Arc<AnalysisReport>> {
        self.analysis_slot.latest()
    }
}
