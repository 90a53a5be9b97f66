// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::io::Write;
use png::{BitDepth, ColorType};
use crate::frame::{Frame, PixelFormat};

/// Failure writing a debug capture.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("Can't encode png {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("Can't write capture {0}")]
    Io(#[from] std::io::Error),
}

trait PngPixelFormat {
    fn png_color_type(&self) -> ColorType;
    fn png_bit_depth(&self) -> BitDepth;
}

impl PngPixelFormat for PixelFormat {
    fn png_color_type(&self) -> ColorType {
        match self {
            PixelFormat::Rgba8888 => ColorType::Rgba,
        }
    }

    fn png_bit_depth(&self) -> BitDepth {
        match self {
            PixelFormat::Rgba8888 => BitDepth::Eight,
        }
    }
}

impl Frame {
    /**
    Encodes the frame as a PNG into `writer`.

    Intended for debug captures; this is not on the per-frame path.
    */
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), CaptureError> {
        let mut encoder = png::Encoder::new(writer, self.width(), self.height());
        encoder.set_color(self.format().png_color_type());
        encoder.set_depth(self.format().png_bit_depth());
        let mut png_writer = encoder.write_header()?;
        png_writer.write_image_data(self.pixels())?;
        png_writer.finish()?;
        Ok(())
    }

    /// Writes a PNG capture of the frame to `path`.
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), CaptureError> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut buffered = std::io::BufWriter::new(file);
        self.write_png(&mut buffered)?;
        buffered.flush()?;
        logwise::info_sync!(
            "Wrote frame capture {geometry} to {path}",
            geometry = logwise::privacy::LogIt(&self.geometry()),
            path = logwise::privacy::LogIt(path.as_ref())
        );
        Ok(())
    }
}

#[cfg(test)] mod tests {
    use crate::frame::Frame;

    #[test] fn png_keeps_geometry() {
        let mut pixels = Vec::with_capacity(3 * 2 * 4);
        for i in 0..6u8 {
            pixels.extend_from_slice(&[i * 40, 255 - i * 40, 7, 255]);
        }
        let frame = Frame::new(pixels, 3, 2).unwrap();
        let mut encoded = Vec::new();
        frame.write_png(&mut encoded).unwrap();

        let decoder = png::Decoder::new(std::io::Cursor::new(encoded.as_slice()));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 3);
        assert_eq!(reader.info().height, 2);
        assert_eq!(reader.info().color_type, png::ColorType::Rgba);
    }
}
