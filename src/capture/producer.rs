// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Drives one sensor image at a time through processing into the [FrameBuffer].

use std::sync::Arc;
use crate::capture::processor::{ProcessError, Processor};
use crate::capture::source::{SensorImage, SourceError};
use crate::frame::{Geometry, PixelFormat};
use crate::frame_buffer::{FrameBuffer, PublishError};
use crate::images::render_request::RenderRequest;

/// Why a sensor image did not become a published frame.
///
/// None of these are fatal; the producer simply skips the cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProducerError {
    #[error("Sensor image had no luma plane")]
    SourceUnavailable,
    #[error("Can't read sensor image {0}")]
    Source(#[from] SourceError),
    #[error("{0}")]
    Processing(#[from] ProcessError),
    #[error("Can't publish frame {0}")]
    Publish(#[from] PublishError),
}

/**
The capture-side half of the pipeline.

Call [Producer::on_image_available] from whatever context the capture device delivers
images on.  The call is synchronous: the copy, the processing and the publish all
happen before it returns, so the caller decides which thread does the work.
*/
#[derive(Debug)]
pub struct Producer<P> {
    frame_buffer: Arc<FrameBuffer>,
    processor: P,
    render_request: RenderRequest,
    skipped: u64,
}

impl<P: Processor> Producer<P> {
    pub fn new(frame_buffer: Arc<FrameBuffer>, processor: P, render_request: RenderRequest) -> Self {
        Self {
            frame_buffer,
            processor,
            render_request,
            skipped: 0,
        }
    }

    /**
    Handles one image from the capture device.

    The luma plane is copied out and `image` is released before processing starts.  On
    success the processed frame is published and a render is requested.  On failure
    nothing is published, the error is logged and returned, and the next call proceeds
    normally.
    */
    pub fn on_image_available<I: SensorImage>(&mut self, image: I) -> Result<Geometry, ProducerError> {
        match self.produce(image) {
            Ok(geometry) => {
                self.render_request.request();
                Ok(geometry)
            }
            Err(err) => {
                self.skipped += 1;
                logwise::warn_sync!(
                    "Producer skipped a frame: {err}",
                    err = logwise::privacy::LogIt(&err)
                );
                Err(err)
            }
        }
    }

    fn produce<I: SensorImage>(&mut self, image: I) -> Result<Geometry, ProducerError> {
        let (luma, geometry) = {
            let plane = image.luma_plane().ok_or(ProducerError::SourceUnavailable)?;
            (plane.copy_packed()?, plane.geometry())
        };
        //we own a copy of the pixels now; give the sensor buffer back
        drop(image);

        let rgba = self.processor.process(&luma, geometry.width, geometry.height)?;
        let expected = geometry.pixel_count() * PixelFormat::Rgba8888.bytes_per_pixel();
        if rgba.len() != expected {
            return Err(ProcessError::MalformedOutput {
                geometry,
                expected,
                actual: rgba.len(),
            }
            .into());
        }
        self.frame_buffer.publish(&rgba, geometry.width, geometry.height)?;
        logwise::trace_sync!(
            "Producer published {geometry}",
            geometry = logwise::privacy::LogIt(&geometry)
        );
        Ok(geometry)
    }

    /// Number of images that did not become a published frame.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn frame_buffer(&self) -> &Arc<FrameBuffer> {
        &self.frame_buffer
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }
}
