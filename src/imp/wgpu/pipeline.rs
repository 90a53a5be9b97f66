// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::images::config::RenderConfig;
use crate::images::quad::{full_screen_quad, vertex_bytes, QuadVertex, QUAD_VERTEX_COUNT};
use crate::images::shader::{FragmentShader, VertexShader};
use crate::imp::wgpu::device::WgpuDevice;
use crate::imp::wgpu::error::SetupError;
use crate::imp::wgpu::texture::FrameTexture;
use wgpu::util::DeviceExt;
use wgpu::{
    AddressMode, BindGroupLayoutEntry, BindingType, Color, ColorTargetState, ErrorFilter, FilterMode,
    LoadOp, MultisampleState, Operations, PipelineLayoutDescriptor, PolygonMode, PrimitiveState,
    PrimitiveTopology, RenderPipelineDescriptor, SamplerDescriptor, StoreOp, VertexBufferLayout, VertexState,
    VertexStepMode,
};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

/**
Everything needed to draw the textured quad except the texture itself.
*/
#[derive(Debug)]
pub(super) struct QuadPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    clear_color: Color,
    debug_name: String,
}

async fn compile(
    device: &wgpu::Device,
    label: &'static str,
    wgsl_code: &str,
) -> Result<wgpu::ShaderModule, SetupError> {
    device.push_error_scope(ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(wgsl_code)),
    });
    if let Some(err) = device.pop_error_scope().await {
        logwise::error_sync!(
            "Shader {label} failed to compile: {err}",
            label = logwise::privacy::LogIt(&label),
            err = logwise::privacy::LogIt(&err)
        );
        return Err(SetupError::ShaderCompile {
            label,
            message: err.to_string(),
        });
    }
    Ok(module)
}

impl QuadPipeline {
    pub(super) async fn new(
        device: &WgpuDevice,
        config: &RenderConfig,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, SetupError> {
        Self::with_shaders(
            device,
            config,
            target_format,
            &VertexShader::full_screen_quad(),
            &FragmentShader::textured(),
        )
        .await
    }

    pub(super) async fn with_shaders(
        device: &WgpuDevice,
        config: &RenderConfig,
        target_format: wgpu::TextureFormat,
        vertex_shader: &VertexShader,
        fragment_shader: &FragmentShader,
    ) -> Result<Self, SetupError> {
        let wgpu_device = device.device();
        let debug_name = config.debug_name.clone();
        let vertex_module = compile(wgpu_device, vertex_shader.label, &vertex_shader.wgsl_code).await?;
        let fragment_module = compile(wgpu_device, fragment_shader.label, &fragment_shader.wgsl_code).await?;

        let bind_group_layout = wgpu_device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&debug_name),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let pipeline_layout = wgpu_device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&debug_name),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [VertexBufferLayout {
            array_stride: QuadVertex::STRIDE as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        }];
        let render_descriptor = RenderPipelineDescriptor {
            label: Some(&debug_name),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &vertex_module,
                entry_point: None,
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                //covers the whole target either way
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: None,
                compilation_options: Default::default(),
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: Default::default(),
                })],
            }),
            multiview: None,
            cache: None,
        };
        wgpu_device.push_error_scope(ErrorFilter::Validation);
        let pipeline = wgpu_device.create_render_pipeline(&render_descriptor);
        if let Some(err) = wgpu_device.pop_error_scope().await {
            logwise::error_sync!("Render pipeline failed to link: {err}", err = logwise::privacy::LogIt(&err));
            return Err(SetupError::ProgramLink {
                message: err.to_string(),
            });
        }

        //bilinear, clamped at the edges; no mipmaps
        let sampler = wgpu_device.create_sampler(&SamplerDescriptor {
            label: Some(&debug_name),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Nearest,
            ..Default::default()
        });

        let vertex_buffer = wgpu_device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&debug_name),
            contents: &vertex_bytes(&full_screen_quad(config.orientation)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let [r, g, b, a] = config.clear_color;
        logwise::trace_sync!("Created quad pipeline");
        Ok(Self {
            pipeline,
            bind_group_layout,
            sampler,
            vertex_buffer,
            clear_color: Color { r, g, b, a },
            debug_name,
        })
    }

    pub(super) fn bind(&self, device: &WgpuDevice, texture: &FrameTexture) -> wgpu::BindGroup {
        device.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&self.debug_name),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Records a pass that clears `target` and draws the quad over all of it.
    pub(super) fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, bind_group: &wgpu::BindGroup) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.debug_name),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(self.clear_color),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
    }
}
