//! 3D LUT parsing, identity detection, trilinear sampling, and `.cube` file I/O.
//!
//! # Format
//!
//! ```text
//! # Comment
//! TITLE "Film Look"
//! LUT_3D_SIZE 33
//! 0.000000 0.000000 0.000000
//! ...
//! 1.000000 1.000000 1.000000
//! ```
//!
//! Data triples are in reading order with R varying fastest, then G, then B.

use std::fmt::Write as _;
use std::path::Path;

use glam::Vec3;

use crate::error::FormatError;

/// Default tolerance for [`Lut3D::is_identity`].
pub const IDENTITY_TOLERANCE: f32 = 0.001;

/// Accepted grid sizes per axis.
pub const SIZE_RANGE: std::ops::RangeInclusive<usize> = 2..=256;

/// A 3D lookup table mapping normalized RGB to normalized RGB.
///
/// Entries are stored R-fastest: node `(r, g, b)` lives at
/// `b * size² + g * size + r`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Grid size per axis (commonly 32, 33, or 64).
    pub size: usize,
    /// LUT entries. Length = size³.
    pub data: Vec<[f32; 3]>,
}

impl Lut3D {
    /// A table whose every node maps to its own coordinate.
    pub fn identity(size: usize) -> Self {
        let step = 1.0 / (size.max(2) - 1) as f32;
        let mut data = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push([r as f32 * step, g as f32 * step, b as f32 * step]);
                }
            }
        }
        Self { size, data }
    }

    /// Wrap R-fastest entries, checking the count against `size³`.
    pub fn from_data(size: usize, data: Vec<[f32; 3]>) -> Result<Self, FormatError> {
        if !SIZE_RANGE.contains(&size) {
            return Err(FormatError::SizeOutOfRange(size));
        }
        let expected = size * size * size;
        if data.len() != expected {
            return Err(FormatError::CountMismatch {
                size,
                expected,
                found: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    /// Parse `.cube` text.
    ///
    /// When no `LUT_3D_SIZE` is declared the size is inferred from the triple
    /// count, which must then be a perfect cube.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut size: Option<usize> = None;
        let mut data: Vec<[f32; 3]> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with("LUT_3D_SIZE") {
                size = Some(parse_size(line, line_no)?);
            } else if line.starts_with("LUT_1D_SIZE") {
                return Err(FormatError::Unsupported1D);
            } else if starts_numeric(line) {
                data.push(parse_triple(line, line_no)?);
            }
            // TITLE, DOMAIN_MIN/MAX and vendor keywords carry nothing we use.
        }

        if data.is_empty() {
            return Err(FormatError::Empty);
        }

        let size = match size {
            Some(size) => size,
            None => infer_size(data.len())?,
        };
        Self::from_data(size, data)
    }

    /// Load a 3D LUT from a `.cube` file.
    pub fn load_cube(path: &Path) -> Result<Self, FormatError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Serialize to `.cube` text with six decimals per component.
    pub fn to_cube_string(&self, title: &str) -> String {
        let mut out = String::with_capacity(self.data.len() * 27 + 64);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "TITLE \"{title}\"");
        let _ = writeln!(out, "LUT_3D_SIZE {}", self.size);
        let _ = writeln!(out);
        for [r, g, b] in &self.data {
            let _ = writeln!(out, "{r:.6} {g:.6} {b:.6}");
        }
        out
    }

    /// Save this 3D LUT to a `.cube` file.
    pub fn save_cube(&self, path: &Path, title: &str) -> Result<(), FormatError> {
        std::fs::write(path, self.to_cube_string(title))?;
        Ok(())
    }

    /// Flat `size³ × 3` view of the entries.
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.data)
    }

    /// Stored value at an integer grid node, indices clamped to the grid.
    pub fn node(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let max = self.size - 1;
        let (r, g, b) = (r.min(max), g.min(max), b.min(max));
        self.data[(b * self.size + g) * self.size + r]
    }

    /// True iff every node stores its own normalized coordinate within
    /// `tolerance` on every channel.
    pub fn is_identity(&self, tolerance: f32) -> bool {
        let step = 1.0 / (self.size - 1) as f32;
        let n = self.size;
        self.data.iter().enumerate().all(|(i, value)| {
            let expected = [
                (i % n) as f32 * step,
                ((i / n) % n) as f32 * step,
                (i / (n * n)) as f32 * step,
            ];
            (0..3).all(|c| (value[c] - expected[c]).abs() <= tolerance)
        })
    }

    /// Trilinear blend at fractional grid coordinates.
    ///
    /// Coordinates are clamped to `[0, size-1]`. Corners are blended along R,
    /// then G, then B. Integer coordinates return the stored node exactly.
    pub fn sample_grid(&self, ri: f32, gi: f32, bi: f32) -> [f32; 3] {
        let max = (self.size - 1) as f32;
        let (ri, gi, bi) = (ri.clamp(0.0, max), gi.clamp(0.0, max), bi.clamp(0.0, max));

        let (r0, g0, b0) = (ri.floor(), gi.floor(), bi.floor());
        let (fr, fg, fb) = (ri - r0, gi - g0, bi - b0);
        let (r0, g0, b0) = (r0 as usize, g0 as usize, b0 as usize);
        let (r1, g1, b1) = (r0 + 1, g0 + 1, b0 + 1);

        let at = |r, g, b| Vec3::from_array(self.node(r, g, b));

        let c00 = at(r0, g0, b0).lerp(at(r1, g0, b0), fr);
        let c10 = at(r0, g1, b0).lerp(at(r1, g1, b0), fr);
        let c01 = at(r0, g0, b1).lerp(at(r1, g0, b1), fr);
        let c11 = at(r0, g1, b1).lerp(at(r1, g1, b1), fr);

        let c0 = c00.lerp(c10, fg);
        let c1 = c01.lerp(c11, fg);

        c0.lerp(c1, fb).to_array()
    }

    /// Sample at a normalized RGB query using half-texel-centered mapping.
    ///
    /// ```text
    /// scaled = v × (N−1)/N + 1/(2N)
    /// idx    = scaled × (N−1)
    /// ```
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        let n = self.size as f32;
        let scale = (n - 1.0) / n;
        let offset = 1.0 / (2.0 * n);
        let [ri, gi, bi] = rgb.map(|v| (v.clamp(0.0, 1.0) * scale + offset) * (n - 1.0));
        self.sample_grid(ri, gi, bi)
    }
}

fn starts_numeric(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
}

fn parse_size(line: &str, line_no: usize) -> Result<usize, FormatError> {
    let invalid = || FormatError::InvalidSize {
        line: line_no,
        text: line.to_string(),
    };
    let mut parts = line.split_whitespace().skip(1);
    let size: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    if !SIZE_RANGE.contains(&size) {
        return Err(FormatError::SizeOutOfRange(size));
    }
    Ok(size)
}

fn parse_triple(line: &str, line_no: usize) -> Result<[f32; 3], FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(FormatError::ShortTriple {
            line: line_no,
            found: tokens.len(),
        });
    }
    let mut rgb = [0.0f32; 3];
    for (slot, token) in rgb.iter_mut().zip(&tokens) {
        *slot = token.parse().map_err(|_| FormatError::NonNumeric {
            line: line_no,
            token: token.to_string(),
        })?;
    }
    Ok(rgb)
}

fn infer_size(count: usize) -> Result<usize, FormatError> {
    let n = (count as f64).cbrt().round() as usize;
    if n * n * n != count {
        return Err(FormatError::NotACube(count));
    }
    Ok(n)
}
