//! Adjustment snapshots, 3D LUTs, and the per-pixel stage chain.

pub mod evaluate;
pub mod lut;
pub mod params;
