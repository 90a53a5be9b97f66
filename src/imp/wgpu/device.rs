// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::imp::wgpu::error::SetupError;
use wgpu::{Limits, Trace};

/**
A wgpu device and its queue.

Cheap to clone; clones share the same device.
*/
#[derive(Debug, Clone)]
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuDevice {
    /**
    Picks an adapter without a surface and binds a device on it.

    The instance is configured from the environment (`WGPU_BACKEND` and friends).
    */
    pub async fn headless() -> Result<Self, SetupError> {
        let descriptor = wgpu::InstanceDescriptor::from_env_or_default();
        let instance = wgpu::Instance::new(&descriptor);
        let options = wgpu::RequestAdapterOptions {
            power_preference: Default::default(),
            force_fallback_adapter: false,
            compatible_surface: None,
        };
        let adapter = instance.request_adapter(&options).await?;
        Self::bind(&adapter).await
    }

    /// [Self::headless], blocking the calling thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn headless_blocking() -> Result<Self, SetupError> {
        test_executors::sleep_on(Self::headless())
    }

    /**
    Binds a device on `adapter`, e.g. one picked for a window surface.
    */
    pub async fn bind(adapter: &wgpu::Adapter) -> Result<Self, SetupError> {
        let info = adapter.get_info();
        //webGL-safe baseline, but let textures be as large as the adapter allows;
        //camera frames routinely exceed the 2048 baseline
        let limits = Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());
        let descriptor = wgpu::DeviceDescriptor {
            label: Some("edge_viewer device"),
            required_features: Default::default(),
            required_limits: limits,
            memory_hints: Default::default(),
            trace: Trace::Off,
        };
        let (device, queue) = adapter.request_device(&descriptor).await?;
        logwise::info_sync!(
            "Bound wgpu device on {adapter} ({backend})",
            adapter = logwise::privacy::LogIt(&info.name),
            backend = logwise::privacy::LogIt(&info.backend)
        );
        Ok(Self { device, queue })
    }

    /// Wraps a device and queue created elsewhere.
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Largest width or height a frame texture may have on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
