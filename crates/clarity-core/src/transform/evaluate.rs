//! Core transform evaluation: applies the full per-pixel chain to one pixel.

use crate::color::white_balance::{apply_white_balance, white_balance_multipliers};
use crate::grading::curves::CurveEvaluator;
use crate::grading::sliders::{apply_contrast, apply_exposure, apply_highlights_shadows, apply_hsl};
use crate::transform::lut::Lut3D;
use crate::transform::params::{AdjustmentParams, HslAdjustment};

/// An [`AdjustmentParams`] snapshot resolved once per render.
///
/// Sorting the curve, deriving white balance multipliers and deciding which
/// stages are active all happen here so the pixel loop only branches on flags.
#[derive(Debug, Clone)]
pub struct PreparedAdjustments<'a> {
    wb_multipliers: Option<[f32; 3]>,
    exposure: Option<f32>,
    contrast: Option<f32>,
    curve: Option<Vec<[f32; 2]>>,
    highlights_shadows: Option<(f32, f32)>,
    hsl: Option<&'a HslAdjustment>,
    lut: Option<&'a Lut3D>,
}

impl<'a> PreparedAdjustments<'a> {
    /// Resolve `params` and an optional LUT.
    ///
    /// A LUT that is an identity within `lut_tolerance` is dropped.
    pub fn new(params: &'a AdjustmentParams, lut: Option<&'a Lut3D>, lut_tolerance: f32) -> Self {
        let wb_multipliers = (!params.white_balance_is_neutral())
            .then(|| white_balance_multipliers(params.temperature, params.tint));
        let highlights_shadows = (params.highlights != 0.0 || params.shadows != 0.0)
            .then_some((params.highlights, params.shadows));

        Self {
            wb_multipliers,
            exposure: (params.exposure != 0.0).then_some(params.exposure),
            contrast: (params.contrast != 0.0).then_some(params.contrast),
            curve: (!params.curve_is_identity()).then(|| params.sorted_curve()),
            highlights_shadows,
            hsl: (!params.hsl.is_neutral()).then_some(&params.hsl),
            lut: lut.filter(|l| !l.is_identity(lut_tolerance)),
        }
    }

    /// True when [`evaluate_transform`] returns every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        self.active_stages().is_empty()
    }

    /// Names of the stages that will run, in order.
    pub fn active_stages(&self) -> Vec<&'static str> {
        let flags = [
            ("white_balance", self.wb_multipliers.is_some()),
            ("exposure", self.exposure.is_some()),
            ("contrast", self.contrast.is_some()),
            ("tone_curve", self.curve.is_some()),
            ("highlights_shadows", self.highlights_shadows.is_some()),
            ("hsl", self.hsl.is_some()),
            ("lut", self.lut.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
            .collect()
    }
}

/// Apply the complete per-pixel chain to one RGB pixel in `0..=255`.
///
/// 1. White balance
/// 2. Exposure
/// 3. Contrast around 128
/// 4. Tone curve, per channel
/// 5. Highlights/shadows
/// 6. HSL
/// 7. 3D LUT
///
/// Inactive stages are skipped; every stage clamps to `0..=255`.
pub fn evaluate_transform(rgb: [f32; 3], prepared: &PreparedAdjustments<'_>) -> [f32; 3] {
    let mut rgb = rgb;

    if let Some(mult) = prepared.wb_multipliers {
        let normalized = apply_white_balance(rgb.map(|c| c / 255.0), mult);
        rgb = normalized.map(|c| c * 255.0);
    }
    if let Some(stops) = prepared.exposure {
        rgb = apply_exposure(rgb, stops);
    }
    if let Some(contrast) = prepared.contrast {
        rgb = apply_contrast(rgb, contrast);
    }
    if let Some(points) = &prepared.curve {
        rgb = CurveEvaluator::new(points).apply_rgb(rgb);
    }
    if let Some((highlights, shadows)) = prepared.highlights_shadows {
        rgb = apply_highlights_shadows(rgb, highlights, shadows);
    }
    if let Some(hsl) = prepared.hsl {
        rgb = apply_hsl(rgb, hsl);
    }
    if let Some(lut) = prepared.lut {
        let mapped = lut.sample(rgb.map(|c| (c / 255.0).clamp(0.0, 1.0)));
        rgb = mapped.map(|c| (c * 255.0).clamp(0.0, 255.0));
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::lut::IDENTITY_TOLERANCE;
    use crate::transform::params::HslShift;

    const EPSILON: f32 = 1e-3;

    fn prepare(params: &AdjustmentParams) -> PreparedAdjustments<'_> {
        PreparedAdjustments::new(params, None, IDENTITY_TOLERANCE)
    }

    #[test]
    fn test_default_params_are_identity() {
        let params = AdjustmentParams::default();
        let prepared = prepare(&params);
        assert!(prepared.is_identity());
        let rgb = [12.0, 130.0, 250.0];
        assert_eq!(evaluate_transform(rgb, &prepared), rgb);
    }

    #[test]
    fn test_identity_lut_is_dropped() {
        let params = AdjustmentParams::default();
        let lut = Lut3D::identity(8);
        let prepared = PreparedAdjustments::new(&params, Some(&lut), IDENTITY_TOLERANCE);
        assert!(prepared.is_identity());
    }

    #[test]
    fn test_active_stages_follow_pipeline_order() {
        let params = AdjustmentParams {
            exposure: 0.5,
            tint: 10.0,
            hsl: HslAdjustment::Global(HslShift {
                saturation: -20.0,
                ..HslShift::default()
            }),
            ..AdjustmentParams::default()
        };
        assert_eq!(
            prepare(&params).active_stages(),
            vec!["white_balance", "exposure", "hsl"]
        );
    }

    #[test]
    fn test_exposure_then_contrast_ordering() {
        // 64 → 128 by exposure, then sits on the contrast pivot.
        let params = AdjustmentParams {
            exposure: 1.0,
            contrast: 100.0,
            ..AdjustmentParams::default()
        };
        let out = evaluate_transform([64.0; 3], &prepare(&params));
        assert_eq!(out, [128.0; 3]);
    }

    #[test]
    fn test_curve_lifts_mid_gray_to_control_point() {
        let params = AdjustmentParams {
            tone_curve: vec![[1.0, 1.0], [0.5, 0.8], [0.0, 0.0]],
            ..AdjustmentParams::default()
        };
        let out = evaluate_transform([127.5; 3], &prepare(&params));
        for c in out {
            assert!((c - 0.8 * 255.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_inverting_lut_is_applied_last() {
        let size = 2;
        let data = (0..size * size * size)
            .map(|i| {
                let (r, g, b) = (i % size, (i / size) % size, i / (size * size));
                [1.0 - r as f32, 1.0 - g as f32, 1.0 - b as f32]
            })
            .collect();
        let lut = Lut3D::from_data(size, data).unwrap();
        let params = AdjustmentParams::default();
        let prepared = PreparedAdjustments::new(&params, Some(&lut), IDENTITY_TOLERANCE);
        assert_eq!(prepared.active_stages(), vec!["lut"]);
        // Half-texel mapping on a 2-node grid lands at 0.25 and 0.75.
        let out = evaluate_transform([0.0, 255.0, 0.0], &prepared);
        assert!((out[0] - 0.75 * 255.0).abs() < EPSILON);
        assert!((out[1] - 0.25 * 255.0).abs() < EPSILON);
        assert!((out[2] - 0.75 * 255.0).abs() < EPSILON);
    }

    #[test]
    fn test_high_temperature_warms() {
        let params = AdjustmentParams {
            temperature: 9000.0,
            ..AdjustmentParams::default()
        };
        let out = evaluate_transform([128.0; 3], &prepare(&params));
        assert!(out[2] < out[0]);
    }
}
