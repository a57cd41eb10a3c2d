//! Slider-based grading adjustments (exposure, contrast, highlights/shadows, HSL).
//!
//! Every function here works on one pixel with channels in `0..=255` as `f32`
//! and clamps its output to that range.

use crate::color::hsl::{hsl_to_rgb, rgb_to_hsl, wrap_hue};
use crate::color::luma;
use crate::transform::params::{HslAdjustment, HslShift};

/// Contrast pivot, the middle of the byte range.
pub const CONTRAST_PIVOT: f32 = 128.0;

/// Half-width of the hue window a per-band HSL shift affects, in degrees.
pub const BAND_HALF_WIDTH: f32 = 60.0;

/// Multiply every channel by `2^stops`.
pub fn apply_exposure(rgb: [f32; 3], stops: f32) -> [f32; 3] {
    let mult = stops.exp2();
    rgb.map(|c| (c * mult).clamp(0.0, 255.0))
}

/// Linear contrast around [`CONTRAST_PIVOT`].
///
/// ```text
/// out = clamp((in − 128) × (1 + contrast/100) + 128)
/// ```
pub fn apply_contrast(rgb: [f32; 3], contrast: f32) -> [f32; 3] {
    let factor = 1.0 + contrast / 100.0;
    rgb.map(|c| ((c - CONTRAST_PIVOT) * factor + CONTRAST_PIVOT).clamp(0.0, 255.0))
}

/// Hermite smoothstep between `edge0` and `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Apply shadows and highlights as a luminance-masked additive shift.
///
/// ```text
/// lum              = (0.299 R + 0.587 G + 0.114 B) / 255
/// shadow_weight    = 1 − smoothstep(0.2, 0.5, lum)
/// highlight_weight = smoothstep(0.5, 0.8, lum)
/// delta = shadow_weight × shadows/100 × 0.5 + highlight_weight × highlights/100 × 0.5
/// out   = clamp(in + delta × 255)
/// ```
///
/// Both at 0.0 produce no change.
pub fn apply_highlights_shadows(rgb: [f32; 3], highlights: f32, shadows: f32) -> [f32; 3] {
    let lum = luma(rgb) / 255.0;
    let shadow_weight = 1.0 - smoothstep(0.2, 0.5, lum);
    let highlight_weight = smoothstep(0.5, 0.8, lum);
    let delta =
        shadow_weight * (shadows / 100.0) * 0.5 + highlight_weight * (highlights / 100.0) * 0.5;
    let delta = delta * 255.0;
    rgb.map(|c| (c + delta).clamp(0.0, 255.0))
}

/// Weight of a band centered at `center` degrees for a pixel of `hue`.
///
/// Triangular window: 1.0 at the center, falling to 0.0 at ±60°.
pub fn band_weight(hue: f32, center: f32) -> f32 {
    let diff = (wrap_hue(hue) - center).abs();
    let dist = diff.min(360.0 - diff);
    (1.0 - dist / BAND_HALF_WIDTH).max(0.0)
}

fn shift_hsl(h: f32, s: f32, l: f32, shift: HslShift, weight: f32) -> (f32, f32, f32) {
    (
        h + shift.hue * weight,
        s * (1.0 + weight * shift.saturation / 100.0),
        l + weight * shift.luminance / 100.0,
    )
}

/// Apply an HSL adjustment.
///
/// The global shift adds hue (wrapping mod 360), scales saturation by
/// `1 + sat/100` and adds `lum/100` to lightness. Per-band shifts follow,
/// each weighted by [`band_weight`] of the pixel's original hue times its
/// original saturation, so achromatic pixels belong to no band.
pub fn apply_hsl(rgb: [f32; 3], adjustment: &HslAdjustment) -> [f32; 3] {
    let (hue, sat, lum) = rgb_to_hsl(rgb.map(|c| c / 255.0));

    let (mut h, mut s, mut l) = shift_hsl(hue, sat, lum, adjustment.global(), 1.0);
    for (center, shift) in adjustment.bands() {
        let weight = band_weight(hue, center) * sat;
        if weight > 0.0 {
            (h, s, l) = shift_hsl(h, s, l, shift, weight);
        }
    }

    let out = hsl_to_rgb(wrap_hue(h), s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
    out.map(|c| (c * 255.0).clamp(0.0, 255.0))
}
