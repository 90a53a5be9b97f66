// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Source frames as delivered by a camera-like device.

use crate::frame::Geometry;

/// A single-channel luma plane borrowed from a sensor image.
#[derive(Debug, Clone, Copy)]
pub struct LumaPlane<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows.  At least `width`.
    pub row_stride: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("source plane {geometry} has no pixels")]
    Empty { geometry: Geometry },
    #[error("row stride {row_stride} is narrower than width {width}")]
    StrideTooSmall { row_stride: usize, width: u32 },
    #[error("source plane needs {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("row stride {row_stride} over {height} rows does not fit in memory")]
    TooLarge { row_stride: usize, height: u32 },
}

impl<'a> LumaPlane<'a> {
    /// A plane whose rows are tightly packed.
    pub fn packed(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            row_stride: width as usize,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.width, self.height)
    }

    /**
    Copies the visible pixels out into a tightly packed buffer of `width * height` bytes.

    Row padding is dropped.  The last row may omit its padding, as sensor buffers often do.
    */
    pub fn copy_packed(&self) -> Result<Vec<u8>, SourceError> {
        let geometry = self.geometry();
        if geometry.is_empty() {
            return Err(SourceError::Empty { geometry });
        }
        let width = self.width as usize;
        let height = self.height as usize;
        if self.row_stride < width {
            return Err(SourceError::StrideTooSmall {
                row_stride: self.row_stride,
                width: self.width,
            });
        }
        let expected = self
            .row_stride
            .checked_mul(height - 1)
            .and_then(|rows| rows.checked_add(width))
            .ok_or(SourceError::TooLarge {
                row_stride: self.row_stride,
                height: self.height,
            })?;
        if self.data.len() < expected {
            return Err(SourceError::Truncated {
                expected,
                actual: self.data.len(),
            });
        }
        if self.row_stride == width {
            return Ok(self.data[..width * height].to_vec());
        }
        let mut packed = Vec::with_capacity(width * height);
        for row in self.data.chunks(self.row_stride).take(height) {
            packed.extend_from_slice(&row[..width]);
        }
        Ok(packed)
    }
}

/**
An image owned by the capture device.

The image is released back to the device when it is dropped; its luma plane must not
be read after that.  [crate::capture::Producer::on_image_available] takes images by value
and drops them as soon as the pixels it needs are copied out.
*/
pub trait SensorImage {
    /**
    The luma plane of this image, or `None` if the device delivered an image without
    usable pixel data.
    */
    fn luma_plane(&self) -> Option<LumaPlane<'_>>;
}

/// A sensor image backed by an owned buffer.  Useful for file playback and tests.
#[derive(Debug, Clone)]
pub struct LumaFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub row_stride: usize,
}

impl LumaFrame {
    pub fn packed(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            row_stride: width as usize,
        }
    }
}

impl SensorImage for LumaFrame {
    fn luma_plane(&self) -> Option<LumaPlane<'_>> {
        Some(LumaPlane {
            data: &self.data,
            width: self.width,
            height: self.height,
            row_stride: self.row_stride,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_plane_copies_verbatim() {
        let data: Vec<u8> = (0..12).collect();
        let plane = LumaPlane::packed(&data, 4, 3);
        assert_eq!(plane.copy_packed().unwrap(), data);
    }

    #[test]
    fn stride_padding_is_dropped() {
        //3 pixels wide, 5 byte stride, last row unpadded
        let data = [1, 2, 3, 0xEE, 0xEE, 4, 5, 6, 0xEE, 0xEE, 7, 8, 9];
        let plane = LumaPlane {
            data: &data,
            width: 3,
            height: 3,
            row_stride: 5,
        };
        assert_eq!(plane.copy_packed().unwrap(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn truncated_plane_is_rejected() {
        let data = [0u8; 10];
        let plane = LumaPlane {
            data: &data,
            width: 4,
            height: 3,
            row_stride: 4,
        };
        assert_eq!(
            plane.copy_packed(),
            Err(SourceError::Truncated {
                expected: 12,
                actual: 10
            })
        );
    }

    #[test]
    fn overflowing_stride_is_rejected() {
        let data = [0u8; 16];
        let plane = LumaPlane {
            data: &data,
            width: 4,
            height: 3,
            row_stride: usize::MAX / 2 + 1,
        };
        assert_eq!(
            plane.copy_packed(),
            Err(SourceError::TooLarge {
                row_stride: usize::MAX / 2 + 1,
                height: 3
            })
        );
    }

    #[test]
    fn narrow_stride_is_rejected() {
        let data = [0u8; 16];
        let plane = LumaPlane {
            data: &data,
            width: 4,
            height: 2,
            row_stride: 3,
        };
        assert!(matches!(plane.copy_packed(), Err(SourceError::StrideTooSmall { .. })));
    }
}
