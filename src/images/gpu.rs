// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The seam between the render loop and whatever actually draws.

use crate::frame::Geometry;

/// A per-frame drawing failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GpuError {
    #[error("No texture allocated")]
    NoTexture,
    #[error("Frame {frame} does not match texture {texture}")]
    TextureSizeMismatch { texture: Geometry, frame: Geometry },
    #[error("Texture {requested} exceeds device limit {max}")]
    TextureTooLarge { requested: Geometry, max: u32 },
    #[error("Device error {0}")]
    Device(String),
}

/**
Something that can hold one 2D RGBA texture and draw it as a full-screen quad.

The render loop calls these in order within one draw cycle:
[Self::resize_texture] only when the frame geometry differs from the current
allocation, then [Self::upload_texture], then [Self::draw_full_screen_quad].
All three are synchronous from the render loop's point of view.
*/
pub trait GpuDrawing {
    /// (Re)allocates the texture at exactly `geometry`.  Previous contents are discarded.
    fn resize_texture(&mut self, geometry: Geometry) -> Result<(), GpuError>;

    /// Replaces the full contents of the texture.  `rgba.len()` is `geometry`'s RGBA size.
    fn upload_texture(&mut self, rgba: &[u8], geometry: Geometry) -> Result<(), GpuError>;

    /// Draws the texture over the whole target with bilinear filtering, clamped at the edges.
    fn draw_full_screen_quad(&mut self) -> Result<(), GpuError>;
}

impl<G: GpuDrawing + ?Sized> GpuDrawing for Box<G> {
    fn resize_texture(&mut self, geometry: Geometry) -> Result<(), GpuError> {
        (**self).resize_texture(geometry)
    }
    fn upload_texture(&mut self, rgba: &[u8], geometry: Geometry) -> Result<(), GpuError> {
        (**self).upload_texture(rgba, geometry)
    }
    fn draw_full_screen_quad(&mut self) -> Result<(), GpuError> {
        (**self).draw_full_screen_quad()
    }
}
