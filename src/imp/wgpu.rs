// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
mod device;
mod error;
mod pipeline;
mod renderer;
mod texture;

pub use device::WgpuDevice;
pub use error::SetupError;
pub use renderer::WgpuRenderer;
