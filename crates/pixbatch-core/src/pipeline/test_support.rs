//! Helpers shared by the pipeline unit tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use crate::types::{FilterKind, ImageOutputFormat};

use super::codec::{CodecError, ImageCodec};

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 20) as u8, (y * 20) as u8, 128])
    }))
}

/// PNG-encoded RGB test image.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    std::fs::write(dir.join(name), png_bytes(width, height)).unwrap();
}

pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) {
    let mut buffer = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .unwrap();
    std::fs::write(dir.join(name), buffer.into_inner()).unwrap();
}

/// Codec that passes payloads through untouched.
///
/// Payloads equal to `fail_on` are rejected as corrupt; `decode_delay`
/// slows down the saver, which is the only caller of `decode` here.
#[derive(Debug, Default)]
pub struct PassthroughCodec {
    fail_on: Option<Vec<u8>>,
    decode_delay: Option<Duration>,
}

impl PassthroughCodec {
    pub fn failing_on(payload: &[u8]) -> Self {
        Self {
            fail_on: Some(payload.to_vec()),
            decode_delay: None,
        }
    }

    pub fn with_decode_delay(mut self, delay: Duration) -> Self {
        self.decode_delay = Some(delay);
        self
    }

    fn check(&self, bytes: &[u8]) -> Result<(), CodecError> {
        match &self.fail_on {
            Some(bad) if bad.as_slice() == bytes => Err(CodecError::Corrupt("rejected".into())),
            _ => Ok(()),
        }
    }
}

impl ImageCodec for PassthroughCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        if let Some(delay) = self.decode_delay {
            std::thread::sleep(delay);
        }
        self.check(bytes)?;
        Ok(DynamicImage::new_luma8(1, 1))
    }

    fn apply_filter(&self, image: DynamicImage, _filter: FilterKind) -> DynamicImage {
        image
    }

    fn encode(
        &self,
        _image: &DynamicImage,
        _format: ImageOutputFormat,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(Vec::new())
    }

    fn transform(&self, bytes: &[u8], _filter: FilterKind) -> Result<Vec<u8>, CodecError> {
        self.check(bytes)?;
        Ok(bytes.to_vec())
    }
}
