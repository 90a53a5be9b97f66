// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
A CPU implementation of [GpuDrawing].

Holds the texture in memory and rasterizes the full-screen quad into an RGBA viewport
with the same sampling rules the GPU backend uses: bilinear filtering, clamp-to-edge,
texel centers at half-integer coordinates.  Useful headless, and as the reference the
GPU backend is checked against.
*/

use crate::frame::{Frame, Geometry, PixelFormat};
use crate::images::config::RenderConfig;
use crate::images::gpu::{GpuDrawing, GpuError};
use crate::images::quad::{edge_tex_coords, full_screen_quad, QuadVertex};

#[derive(Debug)]
struct SoftwareTexture {
    texels: Vec<u8>,
    geometry: Geometry,
}

impl SoftwareTexture {
    fn texel(&self, x: usize, y: usize) -> [f32; 4] {
        let offset = (y * self.geometry.width as usize + x) * 4;
        let t = &self.texels[offset..offset + 4];
        [t[0] as f32, t[1] as f32, t[2] as f32, t[3] as f32]
    }

    //bilinear, clamp-to-edge
    fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        let width = self.geometry.width as usize;
        let height = self.geometry.height as usize;
        let x = u * width as f32 - 0.5;
        let y = v * height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let clamp_x = |x: f32| (x.max(0.0) as usize).min(width - 1);
        let clamp_y = |y: f32| (y.max(0.0) as usize).min(height - 1);
        let (left, right) = (clamp_x(x0), clamp_x(x0 + 1.0));
        let (top, bottom) = (clamp_y(y0), clamp_y(y0 + 1.0));

        let tl = self.texel(left, top);
        let tr = self.texel(right, top);
        let bl = self.texel(left, bottom);
        let br = self.texel(right, bottom);
        let mut out = [0u8; 4];
        for c in 0..4 {
            let upper = tl[c] + (tr[c] - tl[c]) * fx;
            let lower = bl[c] + (br[c] - bl[c]) * fx;
            out[c] = (upper + (lower - upper) * fy).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

/**
A [GpuDrawing] that draws into memory.

```
use edge_viewer::frame::Geometry;
use edge_viewer::images::config::RenderConfig;
use edge_viewer::images::gpu::GpuDrawing;
use edge_viewer::images::software::SoftwareSurface;

let mut surface = SoftwareSurface::new(Geometry::new(2, 1), RenderConfig::default());
surface.resize_texture(Geometry::new(2, 1)).unwrap();
surface.upload_texture(&[10, 20, 30, 255, 40, 50, 60, 255], Geometry::new(2, 1)).unwrap();
surface.draw_full_screen_quad().unwrap();
assert_eq!(surface.viewport().pixel(1, 0), Some([40, 50, 60, 255]));
```
*/
#[derive(Debug)]
pub struct SoftwareSurface {
    config: RenderConfig,
    quad: [QuadVertex; 4],
    texture: Option<SoftwareTexture>,
    viewport: Vec<u8>,
    viewport_geometry: Geometry,
    resizes: u64,
    uploads: u64,
    draws: u64,
}

impl SoftwareSurface {
    /// Creates a surface whose viewport is `viewport` pixels, cleared to the configured color.
    pub fn new(viewport: Geometry, config: RenderConfig) -> Self {
        let quad = full_screen_quad(config.orientation);
        let mut surface = Self {
            config,
            quad,
            texture: None,
            viewport: Vec::new(),
            viewport_geometry: viewport,
            resizes: 0,
            uploads: 0,
            draws: 0,
        };
        surface.clear();
        surface
    }

    fn clear_pixel(&self) -> [u8; 4] {
        self.config
            .clear_color
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    fn clear(&mut self) {
        let pixel = self.clear_pixel();
        self.viewport = pixel.repeat(self.viewport_geometry.pixel_count());
    }

    /// Changes the viewport size, as when the display surface is resized.
    pub fn set_viewport(&mut self, viewport: Geometry) {
        self.viewport_geometry = viewport;
        self.clear();
    }

    /// The most recently drawn image.
    pub fn viewport(&self) -> Frame {
        Frame::new(self.viewport.clone(), self.viewport_geometry.width, self.viewport_geometry.height)
            .unwrap_or_else(|err| unreachable!("viewport storage disagrees with its geometry: {err}"))
    }

    pub fn texture_geometry(&self) -> Option<Geometry> {
        self.texture.as_ref().map(|t| t.geometry)
    }

    /// Raw texture contents, as last uploaded.
    pub fn texture_pixels(&self) -> Option<&[u8]> {
        self.texture.as_ref().map(|t| t.texels.as_slice())
    }

    pub fn resizes(&self) -> u64 {
        self.resizes
    }
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl GpuDrawing for SoftwareSurface {
    fn resize_texture(&mut self, geometry: Geometry) -> Result<(), GpuError> {
        let len = geometry
            .byte_len(PixelFormat::Rgba8888)
            .filter(|_| !geometry.is_empty())
            .ok_or(GpuError::TextureTooLarge {
                requested: geometry,
                max: u32::MAX,
            })?;
        self.texture = Some(SoftwareTexture {
            texels: vec![0; len],
            geometry,
        });
        self.resizes += 1;
        Ok(())
    }

    fn upload_texture(&mut self, rgba: &[u8], geometry: Geometry) -> Result<(), GpuError> {
        let texture = self.texture.as_mut().ok_or(GpuError::NoTexture)?;
        if texture.geometry != geometry || texture.texels.len() != rgba.len() {
            return Err(GpuError::TextureSizeMismatch {
                texture: texture.geometry,
                frame: geometry,
            });
        }
        texture.texels.copy_from_slice(rgba);
        self.uploads += 1;
        Ok(())
    }

    fn draw_full_screen_quad(&mut self) -> Result<(), GpuError> {
        let texture = self.texture.as_ref().ok_or(GpuError::NoTexture)?;
        let (u_left, u_right, v_top, v_bottom) = edge_tex_coords(&self.quad);
        let width = self.viewport_geometry.width as usize;
        let height = self.viewport_geometry.height as usize;
        let mut viewport = Vec::with_capacity(self.viewport.len());
        for py in 0..height {
            let fy = (py as f32 + 0.5) / height as f32;
            let v = v_top + (v_bottom - v_top) * fy;
            for px in 0..width {
                let fx = (px as f32 + 0.5) / width as f32;
                let u = u_left + (u_right - u_left) * fx;
                viewport.extend_from_slice(&texture.sample(u, v));
            }
        }
        self.viewport = viewport;
        self.draws += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::quad::TexCoordOrientation;

    fn gradient(geometry: Geometry) -> Vec<u8> {
        let mut pixels = Vec::new();
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                pixels.extend_from_slice(&[x as u8 * 10, y as u8 * 10, 0, 255]);
            }
        }
        pixels
    }

    fn draw(viewport: Geometry, orientation: TexCoordOrientation, texture: Geometry) -> Frame {
        let config = RenderConfig {
            orientation,
            ..RenderConfig::default()
        };
        let mut surface = SoftwareSurface::new(viewport, config);
        surface.resize_texture(texture).unwrap();
        surface.upload_texture(&gradient(texture), texture).unwrap();
        surface.draw_full_screen_quad().unwrap();
        surface.viewport()
    }

    #[test]
    fn one_to_one_upright_is_identity() {
        let g = Geometry::new(4, 3);
        let frame = draw(g, TexCoordOrientation::Upright, g);
        assert_eq!(frame.pixels(), gradient(g).as_slice());
    }

    #[test]
    fn flip_reverses_rows() {
        let g = Geometry::new(4, 3);
        let frame = draw(g, TexCoordOrientation::FlipVertical, g);
        assert_eq!(frame.pixel(0, 0), Some([0, 20, 0, 255]));
        assert_eq!(frame.pixel(3, 2), Some([30, 0, 0, 255]));
    }

    #[test]
    fn upscale_interpolates_and_clamps() {
        //2x1 texture, 4x1 viewport: outer pixels clamp, inner pixels blend
        let mut surface = SoftwareSurface::new(Geometry::new(4, 1), RenderConfig::default());
        surface.resize_texture(Geometry::new(2, 1)).unwrap();
        surface
            .upload_texture(&[0, 0, 0, 255, 200, 200, 200, 255], Geometry::new(2, 1))
            .unwrap();
        surface.draw_full_screen_quad().unwrap();
        let frame = surface.viewport();
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(1, 0), Some([50, 50, 50, 255]));
        assert_eq!(frame.pixel(2, 0), Some([150, 150, 150, 255]));
        assert_eq!(frame.pixel(3, 0), Some([200, 200, 200, 255]));
    }

    #[test]
    fn upload_requires_matching_texture() {
        let mut surface = SoftwareSurface::new(Geometry::new(1, 1), RenderConfig::default());
        assert_eq!(surface.upload_texture(&[0; 4], Geometry::new(1, 1)), Err(GpuError::NoTexture));
        surface.resize_texture(Geometry::new(2, 2)).unwrap();
        assert!(matches!(
            surface.upload_texture(&[0; 4], Geometry::new(1, 1)),
            Err(GpuError::TextureSizeMismatch { .. })
        ));
    }

    #[test]
    fn starts_cleared() {
        let config = RenderConfig {
            clear_color: [1.0, 0.0, 0.0, 1.0],
            ..RenderConfig::default()
        };
        let surface = SoftwareSurface::new(Geometry::new(2, 2), config);
        assert_eq!(surface.viewport().pixel(1, 1), Some([255, 0, 0, 255]));
    }
}
