//! sRGB transfer curve (IEC 61966-2-1).
//!
//! Buffers hold gamma-encoded bytes. Resampling averages in linear light, so
//! bytes are decoded through [`byte_decode_table`] before filtering and
//! re-encoded with [`encode_byte`] afterward.

/// Encoded values at or below this are on the linear toe.
const ENCODED_KNEE: f32 = 0.040_45;
/// Linear values at or below this are on the linear toe.
const LINEAR_KNEE: f32 = 0.003_130_8;
const TOE_SLOPE: f32 = 12.92;
const GAMMA: f32 = 2.4;

/// Decode one sRGB channel in `0..=1` to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= ENCODED_KNEE {
        c / TOE_SLOPE
    } else {
        ((c + 0.055) / 1.055).powf(GAMMA)
    }
}

/// Encode one linear channel in `0..=1` to sRGB.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= LINEAR_KNEE {
        c * TOE_SLOPE
    } else {
        1.055 * c.powf(1.0 / GAMMA) - 0.055
    }
}

pub fn srgb_to_linear_rgb(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(srgb_to_linear)
}

pub fn linear_to_srgb_rgb(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(linear_to_srgb)
}

/// Linear value of every encoded byte.
pub fn byte_decode_table() -> [f32; 256] {
    std::array::from_fn(|i| srgb_to_linear(i as f32 / 255.0))
}

/// Encode a linear value back to the nearest sRGB byte.
pub fn encode_byte(linear: f32) -> u8 {
    (linear_to_srgb(linear.clamp(0.0, 1.0)) * 255.0)
        .round()
        .clamp(0.0, 255.0) as u8
}
