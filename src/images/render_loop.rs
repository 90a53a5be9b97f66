// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The consumer half of the pipeline.

Each draw cycle claims the latest frame from the [FrameBuffer], if there is one, and
pushes it through a [GpuDrawing].  A cycle that finds nothing new does no GPU work at all.
*/

use std::sync::Arc;
use crate::frame::Geometry;
use crate::frame_buffer::FrameBuffer;
use crate::images::gpu::{GpuDrawing, GpuError};
use crate::images::render_request::{RenderRequest, Wakeup};
use crate::images::reporter::FrameReporter;

/// What one draw cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// No new frame; no GPU calls were made.
    Skipped,
    /// A frame of this geometry was uploaded and drawn.
    Drew(Geometry),
}

/**
Owns the drawing collaborator and the texture allocation state.

Create one per render thread.  The loop is `Send` whenever `G` is, so it may be built on
one thread and moved to the render thread.
*/
#[derive(Debug)]
pub struct RenderLoop<G> {
    frame_buffer: Arc<FrameBuffer>,
    gpu: G,
    //geometry the collaborator's texture is currently allocated at
    texture: Option<Geometry>,
    reporter: FrameReporter,
}

impl<G: GpuDrawing> RenderLoop<G> {
    pub fn new(frame_buffer: Arc<FrameBuffer>, gpu: G) -> Self {
        Self {
            frame_buffer,
            gpu,
            texture: None,
            reporter: FrameReporter::new(),
        }
    }

    /**
    Runs one draw cycle.

    # Errors
    Any [GpuError] from the collaborator.  If resizing failed, the texture is treated as
    unallocated and the next frame resizes again.
    */
    pub fn draw_frame(&mut self) -> Result<DrawOutcome, GpuError> {
        let geometry = {
            let Some(view) = self.frame_buffer.try_take_latest() else {
                self.reporter.record_skip();
                return Ok(DrawOutcome::Skipped);
            };
            let geometry = view.geometry();
            if self.texture != Some(geometry) {
                self.texture = None;
                self.gpu.resize_texture(geometry)?;
                self.texture = Some(geometry);
                logwise::info_sync!(
                    "RenderLoop texture resized to {geometry}",
                    geometry = logwise::privacy::LogIt(&geometry)
                );
            }
            self.gpu.upload_texture(view.pixels(), geometry)?;
            geometry
            //view dropped here; the front storage is free for the next take
        };
        self.gpu.draw_full_screen_quad()?;
        self.reporter.record_draw(geometry);
        logwise::trace_sync!("RenderLoop drew {geometry}", geometry = logwise::privacy::LogIt(&geometry));
        Ok(DrawOutcome::Drew(geometry))
    }

    /**
    Draws each time `request` is raised, until it is closed.

    Returns the first [GpuError]; the caller decides whether to rebuild the collaborator.
    */
    pub fn run(&mut self, request: &RenderRequest) -> Result<(), GpuError> {
        logwise::info_sync!("RenderLoop started");
        loop {
            match request.wait() {
                Wakeup::Render => {
                    if let Err(err) = self.draw_frame() {
                        logwise::error_sync!("RenderLoop stopped: {err}", err = logwise::privacy::LogIt(&err));
                        return Err(err);
                    }
                }
                Wakeup::Closed => break,
                Wakeup::TimedOut => {}
            }
        }
        logwise::info_sync!(
            "RenderLoop finished after {drawn} frames",
            drawn = self.reporter.drawn()
        );
        Ok(())
    }

    pub fn reporter(&self) -> &FrameReporter {
        &self.reporter
    }

    /// Geometry the texture is currently allocated at, if any.
    pub fn texture_geometry(&self) -> Option<Geometry> {
        self.texture
    }

    pub fn frame_buffer(&self) -> &Arc<FrameBuffer> {
        &self.frame_buffer
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn into_gpu(self) -> G {
        self.gpu
    }
}
