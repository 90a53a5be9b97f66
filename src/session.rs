// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Lifecycle of one viewing session.

A [ViewerSession] owns the [FrameBuffer] and the [RenderRequest] shared by the two sides
of the pipeline.  There is no global state: everything a producer or a render loop
needs is handed out from here.

Shutdown order matters.  Stop the producer first (drop it, or stop calling
[Producer::on_image_available]), then call [ViewerSession::shutdown] or close the
request, then join the render thread.

```
use edge_viewer::ViewerSession;
use edge_viewer::capture::{LumaFrame, LumaToRgba};
use edge_viewer::images::RenderConfig;
use edge_viewer::images::software::SoftwareSurface;
use edge_viewer::frame::Geometry;

let session = ViewerSession::new();
let render = session
    .spawn_render_loop(SoftwareSurface::new(Geometry::new(4, 4), RenderConfig::default()))
    .unwrap();
let mut producer = session.producer(LumaToRgba);
producer.on_image_available(LumaFrame::packed(vec![128; 16], 4, 4)).unwrap();
drop(producer);

session.shutdown();
let render_loop = render.join().unwrap();
assert!(render_loop.reporter().drawn() <= 1);
```
*/

use std::sync::Arc;
use std::thread::JoinHandle;
use crate::capture::processor::Processor;
use crate::capture::producer::Producer;
use crate::frame_buffer::{FrameBuffer, FrameBufferStats};
use crate::images::gpu::{GpuDrawing, GpuError};
use crate::images::render_loop::RenderLoop;
use crate::images::render_request::RenderRequest;
use crate::images::reporter::FrameReporter;

/// Why a render thread did not come back cleanly.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderThreadError {
    #[error("Render loop failed {0}")]
    Gpu(#[from] GpuError),
    #[error("Render thread panicked")]
    Panicked,
}

/// Owns the shared state of one producer/render-loop pair.
#[derive(Debug, Default)]
pub struct ViewerSession {
    frame_buffer: Arc<FrameBuffer>,
    render_request: RenderRequest,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_buffer(&self) -> &Arc<FrameBuffer> {
        &self.frame_buffer
    }

    pub fn render_request(&self) -> &RenderRequest {
        &self.render_request
    }

    /// A producer publishing into this session's buffer.
    pub fn producer<P: Processor>(&self, processor: P) -> Producer<P> {
        Producer::new(self.frame_buffer.clone(), processor, self.render_request.clone())
    }

    /// A render loop reading from this session's buffer, for callers that drive draws themselves.
    pub fn render_loop<G: GpuDrawing>(&self, gpu: G) -> RenderLoop<G> {
        RenderLoop::new(self.frame_buffer.clone(), gpu)
    }

    /**
    Starts a thread running [RenderLoop::run] until the session shuts down.
    */
    pub fn spawn_render_loop<G>(&self, gpu: G) -> std::io::Result<RenderThread<G>>
    where
        G: GpuDrawing + Send + 'static,
    {
        let mut render_loop = self.render_loop(gpu);
        let reporter = render_loop.reporter().clone();
        let request = self.render_request.clone();
        let handle = std::thread::Builder::new()
            .name("edge_viewer render".to_string())
            .spawn(move || render_loop.run(&request).map(|_| render_loop))?;
        Ok(RenderThread { handle, reporter })
    }

    /**
    Ends the session: closes the render request so any render loop exits, and reports
    what the buffer saw.

    Drops this handle on the buffer; storage is freed once producers and render loops
    have dropped theirs.
    */
    pub fn shutdown(self) -> FrameBufferStats {
        self.render_request.close();
        let stats = self.frame_buffer.stats();
        logwise::info_sync!(
            "ViewerSession shut down: {published} published, {taken} taken, {dropped} dropped",
            published = stats.published,
            taken = stats.taken,
            dropped = stats.dropped
        );
        stats
    }
}

/// A render loop running on its own thread.
#[derive(Debug)]
pub struct RenderThread<G> {
    handle: JoinHandle<Result<RenderLoop<G>, GpuError>>,
    reporter: FrameReporter,
}

impl<G> RenderThread<G> {
    /// Observes the running loop.
    pub fn reporter(&self) -> &FrameReporter {
        &self.reporter
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the loop to exit and returns it, so its collaborator can be inspected or reused.
    pub fn join(self) -> Result<RenderLoop<G>, RenderThreadError> {
        match self.handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(RenderThreadError::Panicked),
        }
    }
}
