//! Preprocessed frames handed to the classifiers.

use crate::defaults;
use crate::error::{Result, SignError};
use std::fmt;

/// Width and height of a single-channel frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameShape {
    pub width: u32,
    pub height: u32,
}

impl FrameShape {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels (one byte each) a frame of this shape holds.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for FrameShape {
    fn default() -> Self {
        Self::new(defaults::FRAME_SIDE, defaults::FRAME_SIDE)
    }
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single-channel 8-bit intensity image, row-major.
///
/// Produced by the preprocessor; the core only checks its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    shape: FrameShape,
    pixels: Vec<u8>,
}

impl FrameImage {
    /// Wraps raw pixels, rejecting buffers that do not match the declared shape.
    pub fn new(shape: FrameShape, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != shape.pixel_count() {
            return Err(SignError::MalformedFrame {
                expected: format!("{} pixels for {}", shape.pixel_count(), shape),
                actual: format!("{} pixels", pixels.len()),
            });
        }
        Ok(Self { shape, pixels })
    }

    /// A uniformly filled frame.
    pub fn filled(shape: FrameShape, value: u8) -> Self {
        Self {
            shape,
            pixels: vec![value; shape.pixel_count()],
        }
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Fails fast when the frame does not have the shape the classifiers expect.
    pub fn ensure_shape(&self, expected: FrameShape) -> Result<()> {
        if self.shape != expected {
            return Err(SignError::MalformedFrame {
                expected: expected.to_string(),
                actual: self.shape.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape_is_128_square() {
        let shape = FrameShape::default();
        assert_eq!(shape, FrameShape::new(128, 128));
        assert_eq!(shape.pixel_count(), 16384);
        assert_eq!(shape.to_string(), "128x128");
    }

    #[test]
    fn test_new_rejects_wrong_buffer_length() {
        let result = FrameImage::new(FrameShape::new(4, 4), vec![0; 15]);
        match result {
            Err(SignError::MalformedFrame { expected, actual }) => {
                assert_eq!(expected, "16 pixels for 4x4");
                assert_eq!(actual, "15 pixels");
            }
            other => panic!("Expected MalformedFrame, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_shape() {
        let frame = FrameImage::filled(FrameShape::new(64, 64), 255);
        assert!(frame.ensure_shape(FrameShape::new(64, 64)).is_ok());

        let err = frame.ensure_shape(FrameShape::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed frame: expected 128x128, got 64x64"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_filled_frame() {
        let frame = FrameImage::filled(FrameShape::new(2, 3), 7);
        assert_eq!(frame.pixels(), &[7; 6]);
    }
}
