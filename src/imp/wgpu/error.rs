// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0

/// Failure to bring up the wgpu backend.  Unlike [crate::images::GpuError], these are
/// reported once, before the first frame.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SetupError {
    #[error("No such adapter {0}")]
    NoSuchAdapter(#[from] wgpu::RequestAdapterError),
    #[error("Can't create device {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Shader {label} failed to compile: {message}")]
    ShaderCompile { label: &'static str, message: String },
    #[error("Render pipeline failed to link: {message}")]
    ProgramLink { message: String },
}
