// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Frames: one complete decoded image ready for display.
//!
//! A [Frame] is pixel bytes plus the [Geometry] they were produced at. The byte
//! length is checked against the geometry on construction, so every `Frame` in the
//! program satisfies `pixels.len() == width * height * bytes_per_pixel`.
//!
//! ```
//! use edge_viewer::frame::{Frame, Geometry};
//!
//! let frame = Frame::new(vec![0; 2 * 2 * 4], 2, 2).unwrap();
//! assert_eq!(frame.geometry(), Geometry::new(2, 2));
//! assert!(Frame::new(vec![0; 3], 2, 2).is_err());
//! ```

pub(crate) mod png_support;

use std::fmt::{Display, Formatter};

/// Memory layout of a frame's pixels.
///
/// Only one layout crosses the producer/consumer boundary today; the enum exists so
/// that frames carry their layout explicitly rather than by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 8 bits each of red, green, blue, alpha, in that byte order.
    #[default]
    Rgba8888,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 4,
        }
    }
}

/// Width and height of a frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /**
    Number of bytes a frame of this geometry occupies in `format`.

    Returns `None` if the size does not fit in `usize`.
    */
    pub fn byte_len(&self, format: PixelFormat) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(format.bytes_per_pixel())
    }

    /**
    Checks that `len` bytes are exactly one frame of this geometry in `format`.
    */
    pub fn validate(self, len: usize, format: PixelFormat) -> Result<Self, GeometryError> {
        if self.is_empty() {
            return Err(GeometryError::Empty { geometry: self });
        }
        let expected = self
            .byte_len(format)
            .ok_or(GeometryError::TooLarge { geometry: self })?;
        if expected != len {
            return Err(GeometryError::LengthMismatch {
                geometry: self,
                expected,
                actual: len,
            });
        }
        Ok(self)
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Why a byte buffer is not a well-formed frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GeometryError {
    #[error("frame geometry {geometry} has no pixels")]
    Empty { geometry: Geometry },
    #[error("frame geometry {geometry} overflows the address space")]
    TooLarge { geometry: Geometry },
    #[error("frame geometry {geometry} needs {expected} bytes, got {actual}")]
    LengthMismatch {
        geometry: Geometry,
        expected: usize,
        actual: usize,
    },
}

/**
An owned, immutable frame.

Produced by [crate::FrameBuffer::take_latest_copy] and by callers that want to keep
a frame past a single draw cycle (for example to write a debug capture).
*/
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Box<[u8]>,
    geometry: Geometry,
    format: PixelFormat,
}

impl Frame {
    /// Creates an RGBA8888 frame, checking the byte length against the geometry.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, GeometryError> {
        let format = PixelFormat::Rgba8888;
        let geometry = Geometry::new(width, height).validate(pixels.len(), format)?;
        Ok(Self {
            pixels: pixels.into_boxed_slice(),
            geometry,
            format,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
    pub fn width(&self) -> u32 {
        self.geometry.width
    }
    pub fn height(&self) -> u32 {
        self.geometry.height
    }
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels.into_vec()
    }

    /// The pixel at `(x, y)`, row 0 being the top of the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let offset = (y as usize * self.geometry.width as usize + x as usize) * 4;
        let p = &self.pixels[offset..offset + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("geometry", &self.geometry)
            .field("format", &self.format)
            .field("byte_len", &self.pixels.len())
            .finish()
    }
}
