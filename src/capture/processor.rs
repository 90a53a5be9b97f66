// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The processing step between a luma plane and a displayable RGBA frame.

use crate::frame::{Geometry, PixelFormat};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessError {
    #[error("Processing failed: {0}")]
    Failed(String),
    #[error("Processor returned {actual} bytes for {geometry}, expected {expected}")]
    MalformedOutput {
        geometry: Geometry,
        expected: usize,
        actual: usize,
    },
}

/**
Turns a tightly packed luma plane into RGBA8888 pixels.

Implementations must return exactly `width * height * 4` bytes.  The producer checks
this and drops the frame otherwise.

Closures of the right shape are processors:

```
use edge_viewer::capture::{ProcessError, Processor};

let mut invert = |luma: &[u8], _w: u32, _h: u32| -> Result<Vec<u8>, ProcessError> {
    Ok(luma.iter().flat_map(|l| [255 - l, 255 - l, 255 - l, 255]).collect())
};
assert_eq!(invert.process(&[0], 1, 1).unwrap(), vec![255, 255, 255, 255]);
```
*/
pub trait Processor {
    fn process(&mut self, luma: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ProcessError>;
}

impl<F> Processor for F
where
    F: FnMut(&[u8], u32, u32) -> Result<Vec<u8>, ProcessError>,
{
    fn process(&mut self, luma: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ProcessError> {
        self(luma, width, height)
    }
}

/**
Expands each luma sample into an opaque grey pixel.

This is the format conversion at the end of an image-processing chain, without any
processing in front of it.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct LumaToRgba;

impl Processor for LumaToRgba {
    fn process(&mut self, luma: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ProcessError> {
        let geometry = Geometry::new(width, height);
        if luma.len() != geometry.pixel_count() {
            return Err(ProcessError::Failed(format!(
                "luma plane has {} bytes, {geometry} needs {}",
                luma.len(),
                geometry.pixel_count()
            )));
        }
        let mut rgba = Vec::with_capacity(luma.len() * PixelFormat::Rgba8888.bytes_per_pixel());
        for l in luma {
            rgba.extend_from_slice(&[*l, *l, *l, u8::MAX]);
        }
        Ok(rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_expands_to_grey() {
        let rgba = LumaToRgba.process(&[0, 128, 255], 3, 1).unwrap();
        assert_eq!(rgba, vec![0, 0, 0, 255, 128, 128, 128, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn luma_length_is_checked() {
        assert!(matches!(LumaToRgba.process(&[0; 5], 3, 2), Err(ProcessError::Failed(_))));
    }
}
