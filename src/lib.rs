// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! edge_viewer hands processed camera frames to a GPU render loop without tearing and
without blocking either side.

A camera delivers images on its own schedule.  Each one is processed (for example by an
edge detector) into an RGBA frame on the capture thread.  Meanwhile a render loop wakes
up whenever it is asked to and draws whatever is newest.  The two meet in a
[FrameBuffer]:

| Side          | Runs on                | Calls                                   | Never waits for |
|---------------|------------------------|-----------------------------------------|-----------------|
| Producer      | capture/processing     | [FrameBuffer::publish]                  | the GPU         |
| Render loop   | render thread          | [FrameBuffer::try_take_latest], upload  | processing      |

# Guarantees

* The render loop sees either a complete frame or nothing.  Width, height and pixels
  always come from the same publish.
* Frames are not queued.  If two frames are published between draws, the older one is
  dropped; a slow render loop shows fewer frames, never older ones.
* Nothing new means no GPU work.  A draw cycle that finds no pending frame makes no
  upload and no draw call.
* Storage is reallocated only when the frame geometry changes.

# Quick start

```
use edge_viewer::ViewerSession;
use edge_viewer::capture::{LumaFrame, LumaToRgba};
use edge_viewer::frame::Geometry;
use edge_viewer::images::{DrawOutcome, RenderConfig};
use edge_viewer::images::software::SoftwareSurface;

let session = ViewerSession::new();
let mut producer = session.producer(LumaToRgba);
let mut render_loop = session.render_loop(SoftwareSurface::new(Geometry::new(4, 2), RenderConfig::default()));

producer.on_image_available(LumaFrame::packed(vec![200; 8], 4, 2)).unwrap();
assert_eq!(render_loop.draw_frame().unwrap(), DrawOutcome::Drew(Geometry::new(4, 2)));
//nothing new was published
assert_eq!(render_loop.draw_frame().unwrap(), DrawOutcome::Skipped);
assert_eq!(render_loop.gpu().viewport().pixel(0, 0), Some([200, 200, 200, 255]));
```

# Backends

The render loop draws through the [images::GpuDrawing] trait.  With the default
`backend_wgpu` feature, [images::WgpuRenderer] implements it on [wgpu](https://wgpu.rs),
so we inherit its support for DX12, Vulkan, Metal, WebGPU and (with `wgpu_webgl`) WebGL.
[images::software::SoftwareSurface] implements it on the CPU, with the same sampling
rules, for headless use and tests.
*/

logwise::declare_logging_domain!();

pub mod frame;
pub mod frame_buffer;
pub mod capture;
pub mod images;
pub mod session;
mod imp;
mod sys;
mod bittricks;

pub use frame::png_support::CaptureError;
pub use frame::{Frame, Geometry, PixelFormat};
pub use frame_buffer::{FrameBuffer, FrameBufferStats, FrameView, PublishError};
pub use session::{RenderThread, RenderThreadError, ViewerSession};
