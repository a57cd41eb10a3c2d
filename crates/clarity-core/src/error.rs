//! Error types for LUT parsing, buffer invariants, and catalog loading.

/// Malformed `.cube` text. The LUT load is aborted and the owning simulation
/// is treated as unavailable.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid LUT_3D_SIZE declaration on line {line}: {text:?}")]
    InvalidSize { line: usize, text: String },
    #[error("LUT size {0} is out of range (2..=256)")]
    SizeOutOfRange(usize),
    #[error("non-numeric token {token:?} on line {line}")]
    NonNumeric { line: usize, token: String },
    #[error("line {line} has {found} values, expected an RGB triple")]
    ShortTriple { line: usize, found: usize },
    #[error("expected {expected} RGB triples for a {size}³ LUT, found {found}")]
    CountMismatch {
        size: usize,
        expected: usize,
        found: usize,
    },
    #[error("{0} RGB triples do not form a cube and no LUT_3D_SIZE was declared")]
    NotACube(usize),
    #[error("LUT contains no data")]
    Empty,
    #[error("1D LUTs are not supported")]
    Unsupported1D,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A buffer whose dimensions disagree with what the pipeline expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    #[error("buffer dimension mismatch: expected {expected:?}, found {found:?}")]
    Mismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("{len} bytes cannot hold a {width}x{height} RGBA image")]
    ByteLength { width: u32, height: u32, len: usize },
}

/// Failure while reading a simulation manifest.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid simulation manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Umbrella error for render and analysis entry points.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Dimension(#[from] DimensionError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
