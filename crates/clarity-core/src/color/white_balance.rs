//! White balance via black-body color approximation.
//!
//! Temperature is compensated by the ratio between the light color at a
//! neutral reference and at the target temperature. Tint shifts along the
//! green-magenta axis.
//!
//! # Reference
//! - Tanner Helland, "How to Convert Temperature (K) to RGB" (2012)

/// Temperature treated as "no correction".
pub const NEUTRAL_TEMPERATURE: f32 = 5500.0;

/// Supported temperature range in Kelvin. Inputs outside are clamped.
pub const TEMPERATURE_RANGE: (f32, f32) = (2000.0, 10000.0);

/// Approximate RGB color of a black-body radiator at `kelvin`.
///
/// Channels are normalized to `0..=1`. The fit is valid for roughly
/// 1000 K to 40000 K.
pub fn temperature_to_rgb(kelvin: f32) -> [f32; 3] {
    let t = kelvin / 100.0;

    let (r, g, b) = if t <= 66.0 {
        let g = 99.470_802_586_1 * t.ln() - 161.119_568_166_1;
        let b = if t <= 19.0 {
            0.0
        } else {
            138.517_731_223_1 * (t - 10.0).ln() - 305.044_792_730_7
        };
        (255.0, g, b)
    } else {
        (
            329.698_727_446 * (t - 60.0).powf(-0.133_204_759_2),
            288.122_169_528_3 * (t - 60.0).powf(-0.075_514_849_2),
            255.0,
        )
    };

    [r, g, b].map(|c: f32| c.clamp(0.0, 255.0) / 255.0)
}

/// Per-channel multipliers compensating for `temperature` and `tint`.
///
/// - `temperature`: Kelvin, clamped to [`TEMPERATURE_RANGE`]. 5500 K is
///   neutral; higher values warm the image, lower values cool it.
/// - `tint`: signed percent. Positive shifts toward magenta.
///
/// Neutral temperature and zero tint return `[1.0; 3]`.
pub fn white_balance_multipliers(temperature: f32, tint: f32) -> [f32; 3] {
    let temperature = temperature.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);
    if temperature == NEUTRAL_TEMPERATURE && tint == 0.0 {
        return [1.0; 3];
    }

    let target = temperature_to_rgb(temperature);
    let neutral = temperature_to_rgb(NEUTRAL_TEMPERATURE);

    let mut mult = [0.0; 3];
    for i in 0..3 {
        // A zero channel only occurs below ~1900 K, outside the clamped range.
        mult[i] = if target[i] > 0.0 {
            neutral[i] / target[i]
        } else {
            1.0
        };
    }

    let tint = tint / 100.0;
    mult[0] += tint * 0.05;
    mult[1] -= tint * 0.1;
    mult[2] += tint * 0.05;
    mult
}

/// Apply precomputed multipliers to a normalized pixel, clamping to `0..=1`.
pub fn apply_white_balance(rgb: [f32; 3], multipliers: [f32; 3]) -> [f32; 3] {
    [
        (rgb[0] * multipliers[0]).clamp(0.0, 1.0),
        (rgb[1] * multipliers[1]).clamp(0.0, 1.0),
        (rgb[2] * multipliers[2]).clamp(0.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_neutral_is_identity() {
        assert_eq!(white_balance_multipliers(5500.0, 0.0), [1.0; 3]);
        let rgb = [0.5, 0.4, 0.3];
        assert_eq!(apply_white_balance(rgb, [1.0; 3]), rgb);
    }

    #[test]
    fn test_temperature_to_rgb_known_points() {
        let hot = temperature_to_rgb(6700.0);
        assert!((hot[0] - 0.9977).abs() < 1e-3, "{hot:?}");
        assert_eq!(hot[2], 1.0);
        let candle = temperature_to_rgb(1900.0);
        assert_eq!(candle[2], 0.0);
        let daylight = temperature_to_rgb(5500.0);
        assert!((daylight[1] - 0.9313).abs() < 1e-3, "{daylight:?}");
        assert!((daylight[2] - 0.8713).abs() < 1e-3, "{daylight:?}");
    }

    #[test]
    fn test_blue_uses_log_fit_through_6600k() {
        // 138.5177 * ln(56) - 305.0448 = 252.54
        let edge = temperature_to_rgb(6600.0);
        assert_eq!(edge[0], 1.0);
        assert!((edge[2] - 0.9904).abs() < 1e-3, "{edge:?}");
        assert!(edge[2] < 1.0);
    }

    #[test]
    fn test_low_temperature_boosts_blue() {
        // Compensating for warm light pushes blue up and leaves red alone.
        let mult = white_balance_multipliers(3000.0, 0.0);
        assert!((mult[0] - 1.0).abs() < EPSILON);
        assert!(mult[2] > 1.0);
    }

    #[test]
    fn test_high_temperature_cuts_blue() {
        let mult = white_balance_multipliers(9000.0, 0.0);
        assert!(mult[2] < 1.0);
        assert!(mult[0] > 1.0);
    }

    #[test]
    fn test_tint_shifts_green_and_magenta() {
        let mult = white_balance_multipliers(5500.0, 100.0);
        assert!((mult[0] - 1.05).abs() < EPSILON);
        assert!((mult[1] - 0.9).abs() < EPSILON);
        assert!((mult[2] - 1.05).abs() < EPSILON);
    }

    #[test]
    fn test_temperature_is_clamped() {
        assert_eq!(
            white_balance_multipliers(500.0, 0.0),
            white_balance_multipliers(2000.0, 0.0)
        );
        assert_eq!(
            white_balance_multipliers(50_000.0, 0.0),
            white_balance_multipliers(10_000.0, 0.0)
        );
    }

    #[test]
    fn test_apply_clamps() {
        let out = apply_white_balance([0.9, 0.5, 0.1], [2.0, 1.0, -1.0]);
        assert_eq!(out, [1.0, 0.5, 0.0]);
    }
}
