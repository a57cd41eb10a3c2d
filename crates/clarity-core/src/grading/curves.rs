//! Piecewise-linear tone curve evaluation.
//!
//! # Algorithm
//! For input `x` clamped to `[0, 1]`, find the segment `[x0, x1]` that brackets
//! it and interpolate linearly:
//! ```text
//! t = (x − x0) / (x1 − x0)
//! y = y0 + (y1 − y0) × t
//! ```
//! Inputs left of the first or right of the last control point take that
//! endpoint's y (flat extrapolation, no overshoot).
//!
//! # Complexity
//! - Evaluate: O(log N) binary search + O(1) interpolation

/// Evaluates a piecewise-linear curve from control points.
///
/// Control points are `[x, y]` pairs and MUST already be sorted ascending by
/// x; sorting is the caller's job (see
/// [`AdjustmentParams::sorted_curve`](crate::transform::params::AdjustmentParams::sorted_curve)).
///
/// # Performance
/// Borrows control points to avoid heap allocations in the per-pixel path.
#[derive(Debug, Clone, Copy)]
pub struct CurveEvaluator<'a> {
    /// Control points as `[x, y]` pairs, sorted by x.
    pub control_points: &'a [[f32; 2]],
}

impl<'a> CurveEvaluator<'a> {
    pub fn new(control_points: &'a [[f32; 2]]) -> Self {
        Self { control_points }
    }

    /// Evaluate the curve at `x`.
    ///
    /// Evaluating at a control point's x returns exactly that point's y.
    /// Returns `x` (identity) if fewer than 2 control points.
    pub fn evaluate(&self, x: f32) -> f32 {
        let pts = self.control_points;
        let x = x.clamp(0.0, 1.0);
        if pts.len() < 2 {
            return x;
        }

        let last = pts.len() - 1;
        if x <= pts[0][0] {
            return pts[0][1];
        }
        if x >= pts[last][0] {
            return pts[last][1];
        }

        // Binary search for the last point with px <= x
        let mut lo = 0;
        let mut hi = last;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if pts[mid][0] <= x {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let [x0, y0] = pts[lo];
        let [x1, y1] = pts[hi];
        if x1 == x0 {
            return y0;
        }
        let t = (x - x0) / (x1 - x0);
        y0 + (y1 - y0) * t
    }

    /// Apply the curve independently to each channel of a pixel in `0..=255`.
    pub fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| (self.evaluate(c / 255.0) * 255.0).clamp(0.0, 255.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_curve_evaluator_identity_with_two_points() {
        let points = [[0.0, 0.0], [1.0, 1.0]];
        let eval = CurveEvaluator::new(&points);
        assert_eq!(eval.evaluate(0.0), 0.0);
        assert!((eval.evaluate(0.5) - 0.5).abs() < EPSILON);
        assert_eq!(eval.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_curve_evaluator_fewer_than_two_points_is_identity() {
        let eval = CurveEvaluator::new(&[]);
        assert_eq!(eval.evaluate(0.5), 0.5);

        let points = [[0.5, 0.9]];
        let eval = CurveEvaluator::new(&points);
        assert_eq!(eval.evaluate(0.3), 0.3);
    }

    #[test]
    fn test_control_points_evaluate_exactly() {
        let points = [[0.0, 0.05], [0.2, 0.31], [0.5, 0.8], [0.77, 0.66], [1.0, 0.93]];
        let eval = CurveEvaluator::new(&points);
        for [x, y] in points {
            assert_eq!(eval.evaluate(x), y, "x={x}");
        }
    }

    #[test]
    fn test_linear_interpolation_between_points() {
        let points = [[0.0, 0.0], [0.5, 0.8], [1.0, 1.0]];
        let eval = CurveEvaluator::new(&points);
        assert!((eval.evaluate(0.25) - 0.4).abs() < EPSILON);
        assert!((eval.evaluate(0.75) - 0.9).abs() < EPSILON);
    }

    #[test]
    fn test_flat_extrapolation_outside_points() {
        let points = [[0.2, 0.3], [0.8, 0.6]];
        let eval = CurveEvaluator::new(&points);
        assert_eq!(eval.evaluate(0.0), 0.3);
        assert_eq!(eval.evaluate(0.1), 0.3);
        assert_eq!(eval.evaluate(0.95), 0.6);
        assert_eq!(eval.evaluate(7.0), 0.6);
    }

    #[test]
    fn test_duplicate_x_forms_a_step() {
        let points = [[0.0, 0.0], [0.5, 0.2], [0.5, 0.9], [1.0, 1.0]];
        let eval = CurveEvaluator::new(&points);
        // Vertical step: values just right of 0.5 follow the upper branch.
        assert!(eval.evaluate(0.75) > 0.9);
        assert!(eval.evaluate(0.25) < 0.2);
    }

    #[test]
    fn test_apply_rgb_works_in_byte_range() {
        let points = [[0.0, 0.0], [0.5, 0.8], [1.0, 1.0]];
        let eval = CurveEvaluator::new(&points);
        let out = eval.apply_rgb([127.5, 0.0, 255.0]);
        assert!((out[0] - 204.0).abs() < 1e-3);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 255.0);
    }
}
