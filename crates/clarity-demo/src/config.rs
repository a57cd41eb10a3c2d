//! Application configuration for the demo.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default JPEG quality for exports.
const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Container format of the written image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Parse a format name or file extension.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Format implied by the extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }
}

/// Runtime configuration for the demo binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Forced export format. `None` follows the output extension.
    pub format: Option<ExportFormat>,
    /// JPEG quality, 1–100.
    pub jpeg_quality: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: std::env::var("CLARITY_EXPORT_FORMAT")
                .ok()
                .and_then(|s| ExportFormat::from_name(&s)),
            jpeg_quality: std::env::var("CLARITY_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_JPEG_QUALITY)
                .clamp(1, 100),
        }
    }
}

impl AppConfig {
    /// Format to write `output` with: the forced one, then the extension,
    /// then PNG.
    pub fn format_for(&self, output: &Path) -> ExportFormat {
        self.format
            .or_else(|| ExportFormat::from_path(output))
            .unwrap_or(ExportFormat::Png)
    }
}
