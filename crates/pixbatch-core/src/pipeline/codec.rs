//! Image codec adapter: decode, filter, re-encode.
//!
//! The pipeline only talks to images through [`ImageCodec`], so stages can be
//! exercised with substitute codecs. [`ImageCrateCodec`] is the production
//! implementation on top of the `image` crate.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

use crate::config::Config;
use crate::error::PipelineError;
use crate::types::{FilterKind, ImageOutputFormat};

/// Why a payload could not be turned into (or back out of) an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The bytes do not match any known image signature
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// The format was recognized but the data is malformed
    #[error("corrupt image data: {0}")]
    Corrupt(String),

    /// The filtered image could not be encoded
    #[error("encoding failed: {0}")]
    Encode(String),
}

impl CodecError {
    /// Attach the item name, producing the per-item pipeline error.
    pub fn for_item(self, name: &str) -> PipelineError {
        let name = name.to_string();
        match self {
            CodecError::UnsupportedFormat => PipelineError::UnsupportedFormat { name },
            CodecError::Corrupt(message) => PipelineError::Decode { name, message },
            CodecError::Encode(message) => PipelineError::Encode { name, message },
        }
    }
}

/// Decode/filter/encode operations used by the worker pool and the saver.
///
/// Implementations must be shareable across worker threads.
pub trait ImageCodec: Send + Sync {
    /// Decode encoded bytes into an in-memory image.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Apply a filter. Pure: the same input always yields the same output.
    fn apply_filter(&self, image: DynamicImage, filter: FilterKind) -> DynamicImage;

    /// Encode an image into the given output format.
    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageOutputFormat,
    ) -> Result<Vec<u8>, CodecError>;

    /// Decode, filter and re-encode as PNG in one step.
    fn transform(&self, bytes: &[u8], filter: FilterKind) -> Result<Vec<u8>, CodecError> {
        let image = self.decode(bytes)?;
        let filtered = self.apply_filter(image, filter);
        self.encode(&filtered, ImageOutputFormat::Png)
    }
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct ImageCrateCodec {
    blur_sigma: f32,
    max_dimension: u32,
}

impl Default for ImageCrateCodec {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ImageCrateCodec {
    pub fn new(blur_sigma: f32, max_dimension: u32) -> Self {
        Self {
            blur_sigma,
            max_dimension,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.filter.blur_sigma, config.limits.max_image_dimension)
    }

    /// Detect the format from the leading bytes, ignoring any file extension.
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }
}

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        let format = Self::detect_format(bytes).ok_or(CodecError::UnsupportedFormat)?;
        let image = image::ImageReader::with_format(Cursor::new(bytes), format)
            .decode()
            .map_err(|e| CodecError::Corrupt(e.to_string()))?;

        let (width, height) = image.dimensions();
        if width > self.max_dimension || height > self.max_dimension {
            return Err(CodecError::Corrupt(format!(
                "{width}x{height} exceeds the {} pixel limit",
                self.max_dimension
            )));
        }
        Ok(image)
    }

    fn apply_filter(&self, image: DynamicImage, filter: FilterKind) -> DynamicImage {
        match filter {
            FilterKind::Grayscale => DynamicImage::ImageLuma8(image.to_luma8()),
            FilterKind::Blur => image.blur(self.blur_sigma),
        }
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: ImageOutputFormat,
    ) -> Result<Vec<u8>, CodecError> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::from(format))
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(16, 8, |x, y| Rgb([(x * 16) as u8, (y * 32) as u8, 200]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_grayscale_produces_luma_png() {
        let codec = ImageCrateCodec::default();
        let out = codec
            .transform(&encoded(ImageFormat::Jpeg), FilterKind::Grayscale)
            .unwrap();

        assert_eq!(ImageCrateCodec::detect_format(&out), Some(ImageFormat::Png));
        let decoded = codec.decode(&out).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_blur_keeps_dimensions() {
        let codec = ImageCrateCodec::new(1.5, 20000);
        let out = codec
            .transform(&encoded(ImageFormat::Png), FilterKind::Blur)
            .unwrap();
        let decoded = codec.decode(&out).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
    }

    #[test]
    fn test_unrecognized_bytes_are_unsupported() {
        let codec = ImageCrateCodec::default();
        let err = codec.decode(b"definitely not an image").unwrap_err();
        assert_eq!(err, CodecError::UnsupportedFormat);
    }

    #[test]
    fn test_truncated_png_is_corrupt() {
        let codec = ImageCrateCodec::default();
        let mut bytes = encoded(ImageFormat::Png);
        bytes.truncate(24);
        assert!(matches!(codec.decode(&bytes), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn test_format_detected_by_content() {
        let bytes = encoded(ImageFormat::Png);
        assert_eq!(ImageCrateCodec::detect_format(&bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn test_dimension_limit() {
        let codec = ImageCrateCodec::new(2.0, 10);
        let err = codec.decode(&encoded(ImageFormat::Png)).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt(msg) if msg.contains("limit")));
    }

    #[test]
    fn test_codec_error_names_item() {
        let err = CodecError::UnsupportedFormat.for_item("c.jpg");
        assert!(matches!(err, PipelineError::UnsupportedFormat { ref name } if name == "c.jpg"));
        let err = CodecError::Corrupt("bad".into()).for_item("d.png");
        assert!(err.to_string().contains("d.png"));
    }
}
