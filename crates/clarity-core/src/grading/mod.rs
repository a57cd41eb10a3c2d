//! Grading tools: tone curve and slider adjustments.

pub mod curves;
pub mod sliders;
