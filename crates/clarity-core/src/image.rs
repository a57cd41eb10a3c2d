//! Image representation for the grading pipeline.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{Rgba, Rgba32FImage};

use crate::color::transfer::{byte_decode_table, encode_byte};
use crate::error::DimensionError;

/// An interleaved RGBA8 image, row-major, top-to-bottom.
///
/// Every stage either mutates a buffer it exclusively owns or produces a new
/// buffer of identical dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, `width × height` entries of `[R, G, B, A]`.
    pub pixels: Vec<[u8; 4]>,
}

impl PixelBuffer {
    /// Wrap existing pixels, checking that the length matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self, DimensionError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(DimensionError::ByteLength {
                width,
                height,
                len: pixels.len() * 4,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgba; width as usize * height as usize],
        }
    }

    /// Copy a tightly packed RGBA8 byte slice.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, DimensionError> {
        let mismatch = || DimensionError::ByteLength {
            width,
            height,
            len: bytes.len(),
        };
        if bytes.len() != width as usize * height as usize * 4 {
            return Err(mismatch());
        }
        let pixels: &[[u8; 4]] = bytemuck::try_cast_slice(bytes).map_err(|_| mismatch())?;
        Ok(Self {
            width,
            height,
            pixels: pixels.to_vec(),
        })
    }

    /// Borrow the pixel data as packed RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[pixel_index(self.width, x, y)]
    }

    /// Fail with [`DimensionError::Mismatch`] unless `other` has the same size.
    pub fn ensure_same_dimensions(&self, other: &PixelBuffer) -> Result<(), DimensionError> {
        if self.dimensions() != other.dimensions() || self.pixels.len() != other.pixels.len() {
            return Err(DimensionError::Mismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        Ok(())
    }

    /// Convert from a decoded `image` buffer.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: bytemuck::cast_slice(img.as_raw().as_slice()).to_vec(),
        }
    }

    /// Convert into an `image` buffer for encoding.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(self.get(x, y)))
    }

    /// Dimensions after bounding the long edge to `max_dimension`.
    ///
    /// Images already within bounds keep their size; otherwise both edges are
    /// scaled by the same factor and rounded.
    pub fn bounded_dimensions(&self, max_dimension: u32) -> (u32, u32) {
        let (w, h) = self.dimensions();
        if max_dimension == 0 || (w <= max_dimension && h <= max_dimension) {
            return (w, h);
        }
        let scale = (max_dimension as f64 / w as f64).min(max_dimension as f64 / h as f64);
        let nw = ((w as f64 * scale).round() as u32).max(1);
        let nh = ((h as f64 * scale).round() as u32).max(1);
        (nw, nh)
    }

    /// Downscale so the long edge is at most `max_dimension`.
    ///
    /// Color channels are averaged in linear light with a triangle filter;
    /// alpha is averaged as stored. Borrows `self` unchanged when no resize
    /// is needed.
    pub fn downscaled(&self, max_dimension: u32) -> Cow<'_, PixelBuffer> {
        let (nw, nh) = self.bounded_dimensions(max_dimension);
        if (nw, nh) == self.dimensions() {
            return Cow::Borrowed(self);
        }

        let table = byte_decode_table();
        let linear = Rgba32FImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b, a] = self.get(x, y);
            Rgba([
                table[r as usize],
                table[g as usize],
                table[b as usize],
                a as f32 / 255.0,
            ])
        });
        let resized = imageops::resize(&linear, nw, nh, FilterType::Triangle);
        let pixels = resized
            .pixels()
            .map(|Rgba([r, g, b, a])| {
                [
                    encode_byte(*r),
                    encode_byte(*g),
                    encode_byte(*b),
                    (a * 255.0).round().clamp(0.0, 255.0) as u8,
                ]
            })
            .collect();
        Cow::Owned(Self {
            width: nw,
            height: nh,
            pixels,
        })
    }
}

/// Row-major index of `(x, y)`, computed in `usize` so large frames cannot
/// wrap.
fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8_rejects_wrong_length() {
        let err = PixelBuffer::from_rgba8(2, 2, &[0u8; 15]).unwrap_err();
        assert_eq!(
            err,
            DimensionError::ByteLength {
                width: 2,
                height: 2,
                len: 15
            }
        );
    }

    #[test]
    fn test_bytes_roundtrip_through_image_crate() {
        let bytes: Vec<u8> = (0..16u8).collect();
        let buf = PixelBuffer::from_rgba8(2, 2, &bytes).unwrap();
        assert_eq!(buf.get(1, 0), [4, 5, 6, 7]);
        let img = buf.to_rgba_image();
        let back = PixelBuffer::from_rgba_image(&img);
        assert_eq!(back.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_bounded_dimensions_keeps_aspect() {
        let buf = PixelBuffer::filled(1600, 1200, [0, 0, 0, 255]);
        assert_eq!(buf.bounded_dimensions(800), (800, 600));
        assert_eq!(buf.bounded_dimensions(4000), (1600, 1200));
    }

    #[test]
    fn test_downscaled_small_image_is_borrowed() {
        let buf = PixelBuffer::filled(10, 10, [10, 20, 30, 255]);
        assert!(matches!(buf.downscaled(800), Cow::Borrowed(_)));
        let small = buf.downscaled(5);
        assert_eq!(small.dimensions(), (5, 5));
        assert_eq!(small.pixel_count(), 25);
        assert!(small.pixels.iter().all(|px| *px == [10, 20, 30, 255]));
    }

    #[test]
    fn test_downscale_averages_in_linear_light() {
        // Black and white columns average to linear 0.5, not byte 128.
        let pixels = (0..4 * 2)
            .map(|i| if i % 2 == 0 { [0, 0, 0, 255] } else { [255, 255, 255, 255] })
            .collect();
        let buf = PixelBuffer::new(4, 2, pixels).unwrap();
        let small = buf.downscaled(1);
        assert_eq!(small.dimensions(), (1, 1));
        let v = small.get(0, 0)[0];
        assert!((186..=189).contains(&v), "{v}");
    }

    #[test]
    fn test_pixel_index_does_not_wrap_at_u32() {
        // 100_000 * 50_000 is past u32::MAX.
        assert_eq!(pixel_index(100_000, 7, 50_000), 5_000_000_007);
        let buf = PixelBuffer::new(3, 2, (0..6).map(|i| [i as u8; 4]).collect()).unwrap();
        assert_eq!(buf.get(2, 1), [5; 4]);
    }

    #[test]
    fn test_ensure_same_dimensions() {
        let a = PixelBuffer::filled(4, 2, [0; 4]);
        let b = PixelBuffer::filled(2, 4, [0; 4]);
        assert!(a.ensure_same_dimensions(&a.clone()).is_ok());
        assert!(matches!(
            a.ensure_same_dimensions(&b),
            Err(DimensionError::Mismatch { .. })
        ));
    }
}
