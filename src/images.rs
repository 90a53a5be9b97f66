// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! The rendering side of the viewer.

A [render_loop::RenderLoop] claims frames from the [crate::FrameBuffer] and draws them
through a [gpu::GpuDrawing].  Two drawing implementations ship with the crate: the CPU
[software::SoftwareSurface] and, with the `backend_wgpu` feature, [WgpuRenderer].
*/

pub mod config;
pub mod gpu;
pub mod quad;
pub mod render_loop;
pub mod render_request;
pub mod reporter;
pub mod shader;
pub mod software;

pub use config::RenderConfig;
pub use gpu::{GpuDrawing, GpuError};
pub use quad::TexCoordOrientation;
pub use render_loop::{DrawOutcome, RenderLoop};
pub use render_request::{RenderRequest, Wakeup};
pub use reporter::FrameReporter;

#[cfg(feature = "backend_wgpu")]
pub use crate::imp::{SetupError, WgpuDevice, WgpuRenderer};
