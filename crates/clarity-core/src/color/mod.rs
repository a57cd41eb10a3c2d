//! Color math: HSL/HSV conversions, the sRGB transfer curve and white balance.

pub mod hsl;
pub mod transfer;
pub mod white_balance;

/// Rec. 601 luma weights, as used by the highlight/shadow mask and the scopes.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Rec. 601 luma of a pixel in any consistent range.
pub fn luma(rgb: [f32; 3]) -> f32 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}
