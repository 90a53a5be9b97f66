// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! The capture/processing side of the viewer.

A [producer::Producer] is driven once per sensor image by whatever context the
platform delivers images on.  It copies the luma plane out of the sensor-owned
buffer, releases that buffer, runs a [processor::Processor] and publishes the
result into the shared [crate::FrameBuffer].
*/

pub mod source;
pub mod processor;
pub mod producer;

pub use processor::{LumaToRgba, ProcessError, Processor};
pub use producer::{Producer, ProducerError};
pub use source::{LumaFrame, LumaPlane, SensorImage, SourceError};
