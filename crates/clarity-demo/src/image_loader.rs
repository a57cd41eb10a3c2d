//! Image decoding and encoding for the demo application.
//!
//! The core only sees [`PixelBuffer`]s; every container format lives here.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use clarity_core::PixelBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::config::ExportFormat;

/// Load an image from disk as RGBA8.
///
/// Supports the formats enabled in the `image` crate (PNG, JPEG, TIFF, ...).
/// Higher bit depths are quantized to 8 bits per channel.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    Ok(PixelBuffer::from_rgba_image(&img.to_rgba8()))
}

/// Write `buffer` to `path` in `format`.
///
/// JPEG drops the alpha channel.
pub fn save_image(
    buffer: &PixelBuffer,
    path: &Path,
    format: ExportFormat,
    jpeg_quality: u8,
) -> Result<(), ImageLoadError> {
    let rgba = buffer.to_rgba_image();
    match format {
        ExportFormat::Png => rgba
            .save_with_format(path, ImageFormat::Png)
            .map_err(ImageLoadError::Encode),
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            let writer = BufWriter::new(File::create(path)?);
            JpegEncoder::new_with_quality(writer, jpeg_quality)
                .encode_image(&rgb)
                .map_err(ImageLoadError::Encode)
        }
    }
}

/// Errors that can occur while reading or writing images.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut buf = PixelBuffer::filled(5, 3, [10, 20, 30, 40]);
        buf.pixels[7] = [255, 0, 128, 255];

        save_image(&buf, &path, ExportFormat::Png, 92).unwrap();
        assert_eq!(load_image(&path).unwrap(), buf);
    }

    #[test]
    fn test_jpeg_export_is_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let buf = PixelBuffer::filled(16, 16, [120, 120, 120, 10]);

        save_image(&buf, &path, ExportFormat::Jpeg, 92).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (16, 16));
        assert!(loaded.pixels.iter().all(|px| px[3] == 255));
    }

    #[test]
    fn test_missing_file_fails_to_decode() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode(_)));
    }
}
