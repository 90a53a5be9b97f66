// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::sync::{Arc, Mutex, PoisonError};
use crate::frame::{Frame, Geometry, PixelFormat};
use crate::images::config::RenderConfig;
use crate::images::gpu::{GpuDrawing, GpuError};
use crate::images::shader::{FragmentShader, VertexShader};
use crate::imp::wgpu::device::WgpuDevice;
use crate::imp::wgpu::error::SetupError;
use crate::imp::wgpu::pipeline::QuadPipeline;
use crate::imp::wgpu::texture::{aligned_bytes_per_row, extent, FrameTexture, FRAME_TEXTURE_FORMAT};
use wgpu::PollType;

#[derive(Debug)]
enum Target {
    //owned texture we can read back
    Offscreen {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
        geometry: Geometry,
    },
    //supplied by the caller each frame, e.g. from a surface
    External(Option<wgpu::TextureView>),
}

/**
Draws frames with wgpu.

Either renders offscreen, into a texture that [Self::read_viewport] can copy back, or into
a view supplied per frame with [Self::set_target_view] (for example the current texture of
a window surface).
*/
#[derive(Debug)]
pub struct WgpuRenderer {
    device: WgpuDevice,
    config: RenderConfig,
    pipeline: QuadPipeline,
    texture: Option<(FrameTexture, wgpu::BindGroup)>,
    target: Target,
    device_error: Arc<Mutex<Option<String>>>,
}

impl WgpuRenderer {
    /// Renders into an owned `viewport`-sized RGBA texture.
    pub async fn offscreen(device: WgpuDevice, config: RenderConfig, viewport: Geometry) -> Result<Self, SetupError> {
        Self::offscreen_with_shaders(
            device,
            config,
            viewport,
            &VertexShader::full_screen_quad(),
            &FragmentShader::textured(),
        )
        .await
    }

    /**
    Like [Self::offscreen], with custom shaders.

    The shaders must keep the quad's interface: vertex inputs at locations 0 and 1, the
    frame texture at binding 0 and the sampler at binding 1.
    */
    pub async fn offscreen_with_shaders(
        device: WgpuDevice,
        config: RenderConfig,
        viewport: Geometry,
        vertex_shader: &VertexShader,
        fragment_shader: &FragmentShader,
    ) -> Result<Self, SetupError> {
        let pipeline =
            QuadPipeline::with_shaders(&device, &config, FRAME_TEXTURE_FORMAT, vertex_shader, fragment_shader).await?;
        let target = Self::offscreen_target(&device, &config, viewport);
        Ok(Self::assemble(device, config, pipeline, target))
    }

    /**
    Renders into views of `format` supplied with [Self::set_target_view].
    */
    pub async fn for_target_format(
        device: WgpuDevice,
        config: RenderConfig,
        format: wgpu::TextureFormat,
    ) -> Result<Self, SetupError> {
        let pipeline = QuadPipeline::new(&device, &config, format).await?;
        Ok(Self::assemble(device, config, pipeline, Target::External(None)))
    }

    fn assemble(device: WgpuDevice, config: RenderConfig, pipeline: QuadPipeline, target: Target) -> Self {
        let device_error = Arc::new(Mutex::new(None));
        let move_error = device_error.clone();
        device.device().on_uncaptured_error(Box::new(move |err| {
            logwise::error_sync!("wgpu device error: {err}", err = logwise::privacy::LogIt(&err));
            *move_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(err.to_string());
        }));
        Self {
            device,
            config,
            pipeline,
            texture: None,
            target,
            device_error,
        }
    }

    fn offscreen_target(device: &WgpuDevice, config: &RenderConfig, viewport: Geometry) -> Target {
        let label = format!("{}_viewport", config.debug_name);
        let texture = device.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: extent(viewport),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Target::Offscreen {
            texture,
            view,
            geometry: viewport,
        }
    }

    /// Sets the view the next draw renders into.  Has no effect on an offscreen renderer.
    pub fn set_target_view(&mut self, view: wgpu::TextureView) {
        match &mut self.target {
            Target::External(slot) => *slot = Some(view),
            Target::Offscreen { .. } => {
                logwise::warn_sync!("set_target_view ignored by an offscreen WgpuRenderer");
            }
        }
    }

    /// Changes the size of the offscreen viewport.
    pub fn set_viewport(&mut self, viewport: Geometry) {
        if matches!(self.target, Target::Offscreen { .. }) {
            self.target = Self::offscreen_target(&self.device, &self.config, viewport);
        }
    }

    pub fn device(&self) -> &WgpuDevice {
        &self.device
    }

    pub fn texture_geometry(&self) -> Option<Geometry> {
        self.texture.as_ref().map(|(texture, _)| texture.geometry())
    }

    fn take_device_error(&self) -> Result<(), GpuError> {
        match self.device_error.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(message) => Err(GpuError::Device(message)),
            None => Ok(()),
        }
    }

    /**
    Copies the offscreen viewport back to the CPU.  Blocks until the GPU is done.
    */
    pub fn read_viewport(&self) -> Result<Frame, GpuError> {
        let Target::Offscreen { texture, geometry, .. } = &self.target else {
            return Err(GpuError::Device("no offscreen target to read".to_string()));
        };
        let geometry = *geometry;
        let device = self.device.device();
        let padded_bytes_per_row = aligned_bytes_per_row(geometry.width);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("viewport readback"),
            size: padded_bytes_per_row as u64 * geometry.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("viewport readback"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: None,
                },
            },
            extent(geometry),
        );
        self.device.queue().submit(std::iter::once(encoder.finish()));

        let (sender, receiver) = std::sync::mpsc::channel();
        readback.map_async(wgpu::MapMode::Read, .., move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(PollType::Wait)
            .map_err(|err| GpuError::Device(err.to_string()))?;
        receiver
            .recv()
            .map_err(|err| GpuError::Device(err.to_string()))?
            .map_err(|err| GpuError::Device(err.to_string()))?;

        let row_len = geometry.width as usize * PixelFormat::Rgba8888.bytes_per_pixel();
        let mut pixels = Vec::with_capacity(row_len * geometry.height as usize);
        {
            let mapped = readback.slice(..).get_mapped_range();
            for row in mapped.chunks(padded_bytes_per_row as usize).take(geometry.height as usize) {
                pixels.extend_from_slice(&row[..row_len]);
            }
        }
        readback.unmap();
        self.take_device_error()?;
        Frame::new(pixels, geometry.width, geometry.height).map_err(|err| GpuError::Device(err.to_string()))
    }
}

impl GpuDrawing for WgpuRenderer {
    fn resize_texture(&mut self, geometry: Geometry) -> Result<(), GpuError> {
        //release the old texture before allocating its replacement
        self.texture = None;
        let texture = FrameTexture::allocate(&self.device, geometry, &self.config.debug_name)?;
        let bind_group = self.pipeline.bind(&self.device, &texture);
        self.texture = Some((texture, bind_group));
        self.take_device_error()
    }

    fn upload_texture(&mut self, rgba: &[u8], geometry: Geometry) -> Result<(), GpuError> {
        let (texture, _) = self.texture.as_ref().ok_or(GpuError::NoTexture)?;
        texture.upload(self.device.queue(), rgba, geometry)?;
        self.take_device_error()
    }

    fn draw_full_screen_quad(&mut self) -> Result<(), GpuError> {
        let (_, bind_group) = self.texture.as_ref().ok_or(GpuError::NoTexture)?;
        let view = match &self.target {
            Target::Offscreen { view, .. } => view,
            Target::External(Some(view)) => view,
            Target::External(None) => return Err(GpuError::Device("no target view set".to_string())),
        };
        let mut encoder = self
            .device
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&self.config.debug_name),
            });
        self.pipeline.encode(&mut encoder, view, bind_group);
        self.device.queue().submit(std::iter::once(encoder.finish()));
        self.take_device_error()
    }
}
