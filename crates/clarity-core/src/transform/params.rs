//! Central parameter snapshot that defines the entire pixel transform.
//!
//! `AdjustmentParams` is the single source of truth for one render. The
//! caller builds a fresh snapshot on every interaction; the pipeline never
//! mutates it.

use serde::{Deserialize, Serialize};

use crate::color::white_balance::NEUTRAL_TEMPERATURE;

/// Two-point identity tone curve.
pub const IDENTITY_CURVE: [[f32; 2]; 2] = [[0.0, 0.0], [1.0, 1.0]];

/// Hue, saturation, and luminance shift.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslShift {
    /// Hue rotation in degrees. Wraps modulo 360.
    pub hue: f32,
    /// Saturation change in percent. `-100` = grayscale, `100` = double.
    pub saturation: f32,
    /// Luminance offset in percent of full range.
    pub luminance: f32,
}

impl HslShift {
    pub fn is_neutral(&self) -> bool {
        self.hue == 0.0 && self.saturation == 0.0 && self.luminance == 0.0
    }
}

/// HSL adjustment: one global shift, or a global shift plus per-band shifts.
///
/// Band shifts are weighted by how close a pixel's hue is to the band's
/// center (0° red, 120° green, 240° blue).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HslAdjustment {
    Global(HslShift),
    PerBand {
        #[serde(default)]
        global: HslShift,
        #[serde(default)]
        red: HslShift,
        #[serde(default)]
        green: HslShift,
        #[serde(default)]
        blue: HslShift,
    },
}

impl Default for HslAdjustment {
    fn default() -> Self {
        Self::Global(HslShift::default())
    }
}

impl HslAdjustment {
    /// The shift applied to every pixel regardless of hue.
    pub fn global(&self) -> HslShift {
        match *self {
            Self::Global(shift) => shift,
            Self::PerBand { global, .. } => global,
        }
    }

    /// Band shifts with their center hue, empty for [`HslAdjustment::Global`].
    pub fn bands(&self) -> Vec<(f32, HslShift)> {
        match *self {
            Self::Global(_) => Vec::new(),
            Self::PerBand {
                red, green, blue, ..
            } => [(0.0, red), (120.0, green), (240.0, blue)]
                .into_iter()
                .filter(|(_, shift)| !shift.is_neutral())
                .collect(),
        }
    }

    pub fn is_neutral(&self) -> bool {
        match self {
            Self::Global(shift) => shift.is_neutral(),
            Self::PerBand {
                global,
                red,
                green,
                blue,
            } => {
                global.is_neutral() && red.is_neutral() && green.is_neutral() && blue.is_neutral()
            }
        }
    }
}

/// Film grain overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrainParams {
    /// Noise strength, `0..=100`.
    pub amount: f32,
    /// Grain size. Carried for callers, currently not consumed by the pixel stage.
    pub size: f32,
}

impl Default for GrainParams {
    fn default() -> Self {
        Self {
            amount: 0.0,
            size: 1.0,
        }
    }
}

impl GrainParams {
    pub fn is_active(&self) -> bool {
        self.amount > 0.0
    }
}

/// Radial darkening toward the frame edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteParams {
    /// Darkening strength, `0..=100`.
    pub amount: f32,
    /// Radius of the unaffected region relative to the frame, `0..=1`.
    pub size: f32,
    /// Falloff shape, `0..=1`. Higher values give a harder edge.
    pub roundness: f32,
}

impl Default for VignetteParams {
    fn default() -> Self {
        Self {
            amount: 0.0,
            size: 0.5,
            roundness: 0.5,
        }
    }
}

impl VignetteParams {
    pub fn is_active(&self) -> bool {
        self.amount > 0.0
    }
}

/// Unsharp-mask sharpening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpenParams {
    /// Strength, `0..=100`.
    pub amount: f32,
    /// Gaussian blur radius in pixels.
    pub radius: f32,
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self {
            amount: 0.0,
            radius: 1.0,
        }
    }
}

impl SharpenParams {
    pub fn is_active(&self) -> bool {
        self.amount > 0.0 && self.radius > 0.0
    }
}

/// Every adjustment for one render.
/// This is the immutable contract between the caller and the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentParams {
    /// Exposure in stops. 0.0 = neutral.
    pub exposure: f32,
    /// Contrast in percent around the mid-gray pivot. 0.0 = neutral.
    pub contrast: f32,
    /// White balance temperature in Kelvin, 2000–10000. 5500 = neutral.
    pub temperature: f32,
    /// Green-magenta tint in percent. 0.0 = neutral.
    pub tint: f32,
    /// Highlight recovery in percent. 0.0 = neutral.
    pub highlights: f32,
    /// Shadow lift in percent. 0.0 = neutral.
    pub shadows: f32,

    /// Tone curve control points `[x, y]` in `0..=1`, in any order.
    pub tone_curve: Vec<[f32; 2]>,
    pub hsl: HslAdjustment,

    // Spatial and post effects
    pub grain: GrainParams,
    pub vignette: VignetteParams,
    pub sharpen: SharpenParams,
}

impl Default for AdjustmentParams {
    /// Produces an identity transform; the image passes through unchanged.
    fn default() -> Self {
        Self {
            exposure: 0.0,
            contrast: 0.0,
            temperature: NEUTRAL_TEMPERATURE,
            tint: 0.0,
            highlights: 0.0,
            shadows: 0.0,
            tone_curve: IDENTITY_CURVE.to_vec(),
            hsl: HslAdjustment::default(),
            grain: GrainParams::default(),
            vignette: VignetteParams::default(),
            sharpen: SharpenParams::default(),
        }
    }
}

impl AdjustmentParams {
    /// Tone curve points sorted ascending by x.
    ///
    /// Fewer than two points fall back to the identity curve.
    pub fn sorted_curve(&self) -> Vec<[f32; 2]> {
        if self.tone_curve.len() < 2 {
            return IDENTITY_CURVE.to_vec();
        }
        let mut points = self.tone_curve.clone();
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        points
    }

    /// True when the tone curve maps every input to itself.
    pub fn curve_is_identity(&self) -> bool {
        let points = self.sorted_curve();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return true;
        };
        first[0] == 0.0 && last[0] == 1.0 && points.iter().all(|p| p[0] == p[1])
    }

    pub fn white_balance_is_neutral(&self) -> bool {
        self.temperature == NEUTRAL_TEMPERATURE && self.tint == 0.0
    }
}

/// Partial snapshot. `Some` fields replace the matching field of a base
/// snapshot; `None` fields leave it untouched.
///
/// Simulations carry one of these as their default look.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadows: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_curve: Option<Vec<[f32; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hsl: Option<HslAdjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain: Option<GrainParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vignette: Option<VignetteParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpen: Option<SharpenParams>,
}

impl AdjustmentOverrides {
    /// The basic-adjustment reset every built-in simulation starts from.
    pub fn neutral_basics() -> Self {
        Self {
            exposure: Some(0.0),
            contrast: Some(0.0),
            temperature: Some(NEUTRAL_TEMPERATURE),
            tint: Some(0.0),
            hsl: Some(HslAdjustment::default()),
            ..Self::default()
        }
    }

    /// Merge onto `base`, returning the combined snapshot.
    pub fn apply_to(&self, base: &AdjustmentParams) -> AdjustmentParams {
        let mut out = base.clone();
        if let Some(v) = self.exposure {
            out.exposure = v;
        }
        if let Some(v) = self.contrast {
            out.contrast = v;
        }
        if let Some(v) = self.temperature {
            out.temperature = v;
        }
        if let Some(v) = self.tint {
            out.tint = v;
        }
        if let Some(v) = self.highlights {
            out.highlights = v;
        }
        if let Some(v) = self.shadows {
            out.shadows = v;
        }
        if let Some(v) = &self.tone_curve {
            out.tone_curve = v.clone();
        }
        if let Some(v) = self.hsl {
            out.hsl = v;
        }
        if let Some(v) = self.grain {
            out.grain = v;
        }
        if let Some(v) = self.vignette {
            out.vignette = v;
        }
        if let Some(v) = self.sharpen {
            out.sharpen = v;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let params = AdjustmentParams::default();
        assert!(params.white_balance_is_neutral());
        assert!(params.curve_is_identity());
        assert!(params.hsl.is_neutral());
        assert!(!params.grain.is_active());
        assert!(!params.vignette.is_active());
        assert!(!params.sharpen.is_active());
    }

    #[test]
    fn test_sorted_curve_orders_by_x() {
        let params = AdjustmentParams {
            tone_curve: vec![[1.0, 1.0], [0.5, 0.8], [0.0, 0.0]],
            ..Default::default()
        };
        assert_eq!(
            params.sorted_curve(),
            vec![[0.0, 0.0], [0.5, 0.8], [1.0, 1.0]]
        );
        assert!(!params.curve_is_identity());
    }

    #[test]
    fn test_short_curve_falls_back_to_identity() {
        let params = AdjustmentParams {
            tone_curve: vec![[0.3, 0.9]],
            ..Default::default()
        };
        assert_eq!(params.sorted_curve(), IDENTITY_CURVE.to_vec());
        assert!(params.curve_is_identity());
    }

    #[test]
    fn test_diagonal_curve_with_inner_point_is_identity() {
        let params = AdjustmentParams {
            tone_curve: vec![[0.0, 0.0], [0.4, 0.4], [1.0, 1.0]],
            ..Default::default()
        };
        assert!(params.curve_is_identity());
    }

    #[test]
    fn test_hsl_adjustment_serde_tagging() {
        let json = r#"{"mode":"per_band","global":{"hue":10.0},"red":{"saturation":-50.0}}"#;
        let adj: HslAdjustment = serde_json::from_str(json).unwrap();
        assert_eq!(adj.global().hue, 10.0);
        let bands = adj.bands();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].0, 0.0);
        assert_eq!(bands[0].1.saturation, -50.0);

        let global: HslAdjustment =
            serde_json::from_str(r#"{"mode":"global","luminance":5.0}"#).unwrap();
        assert_eq!(global.global().luminance, 5.0);
        assert!(global.bands().is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let params: AdjustmentParams = serde_json::from_str(r#"{"exposure":1.5}"#).unwrap();
        assert_eq!(params.exposure, 1.5);
        assert_eq!(params.temperature, NEUTRAL_TEMPERATURE);
        assert_eq!(params.tone_curve, IDENTITY_CURVE.to_vec());
        assert_eq!(params.vignette.size, 0.5);
    }

    #[test]
    fn test_overrides_apply_only_some_fields() {
        let base = AdjustmentParams {
            exposure: 1.0,
            shadows: 20.0,
            ..Default::default()
        };
        let overrides = AdjustmentOverrides {
            exposure: Some(-0.5),
            vignette: Some(VignetteParams {
                amount: 30.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = overrides.apply_to(&base);
        assert_eq!(merged.exposure, -0.5);
        assert_eq!(merged.shadows, 20.0);
        assert_eq!(merged.vignette.amount, 30.0);
    }

    #[test]
    fn test_neutral_basics_resets_basics() {
        let base = AdjustmentParams {
            exposure: 2.0,
            temperature: 3000.0,
            sharpen: SharpenParams {
                amount: 40.0,
                radius: 2.0,
            },
            ..Default::default()
        };
        let merged = AdjustmentOverrides::neutral_basics().apply_to(&base);
        assert_eq!(merged.exposure, 0.0);
        assert_eq!(merged.temperature, NEUTRAL_TEMPERATURE);
        assert_eq!(merged.sharpen.amount, 40.0);
    }
}
