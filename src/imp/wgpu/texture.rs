// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::frame::{Geometry, PixelFormat};
use crate::images::gpu::GpuError;
use crate::imp::wgpu::device::WgpuDevice;
use wgpu::{Extent3d, TexelCopyBufferLayout, TexelCopyTextureInfo};

pub(super) const FRAME_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub(super) fn extent(geometry: Geometry) -> Extent3d {
    Extent3d {
        width: geometry.width,
        height: geometry.height,
        depth_or_array_layers: 1,
    }
}

/**
Rounds a row of `width` RGBA pixels up to wgpu's buffer copy alignment.
*/
pub(super) fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * PixelFormat::Rgba8888.bytes_per_pixel() as u32;
    unaligned.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// The sampled texture a frame is uploaded into.
#[derive(Debug)]
pub(super) struct FrameTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    geometry: Geometry,
    debug_name: String,
}

impl FrameTexture {
    pub(super) fn allocate(device: &WgpuDevice, geometry: Geometry, debug_name: &str) -> Result<Self, GpuError> {
        let max = device.max_texture_dimension();
        if geometry.is_empty() || geometry.width > max || geometry.height > max {
            return Err(GpuError::TextureTooLarge {
                requested: geometry,
                max,
            });
        }
        let debug_name = format!("{debug_name}_frame_texture");
        let texture = device.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(&debug_name),
            size: extent(geometry),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            geometry,
            debug_name,
        })
    }

    pub(super) fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Replaces the whole texture with `rgba`, which is tightly packed.
    pub(super) fn upload(&self, queue: &wgpu::Queue, rgba: &[u8], geometry: Geometry) -> Result<(), GpuError> {
        if geometry != self.geometry || Some(rgba.len()) != geometry.byte_len(PixelFormat::Rgba8888) {
            return Err(GpuError::TextureSizeMismatch {
                texture: self.geometry,
                frame: geometry,
            });
        }
        let _upload_guard = logwise::profile_begin!("frame_texture_upload");
        logwise::trace_sync!(
            "Uploading {name} {geometry}",
            name = logwise::privacy::LogIt(&self.debug_name),
            geometry = logwise::privacy::LogIt(&geometry)
        );
        //write_texture has no row alignment requirement, so the frame goes up as-is
        queue.write_texture(
            TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(geometry.width * PixelFormat::Rgba8888.bytes_per_pixel() as u32),
                rows_per_image: Some(geometry.height),
            },
            extent(geometry),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_alignment() {
        assert_eq!(aligned_bytes_per_row(1), 256);
        assert_eq!(aligned_bytes_per_row(64), 256);
        assert_eq!(aligned_bytes_per_row(65), 512);
        assert_eq!(aligned_bytes_per_row(640), 2560);
    }
}
