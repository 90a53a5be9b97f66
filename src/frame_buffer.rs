// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Double-buffered hand-off of the latest frame from a producer to a render loop.

The main idea is,

1.  The producer copies each finished frame into the *back* storage under the shared lock.
2.  The render loop, when it finds the back storage dirty, swaps it with its own *front*
    storage under the same lock.  The swap is O(1); no pixels are copied.
3.  The render loop uploads from the front storage with the shared lock released, so the
    producer is never blocked behind a GPU call.

Frames are never queued.  If the producer publishes twice between two takes, the first frame
is overwritten and counted as dropped.

```
use edge_viewer::FrameBuffer;

let frame_buffer = FrameBuffer::new();
assert!(frame_buffer.try_take_latest().is_none());

frame_buffer.publish(&[255; 2 * 2 * 4], 2, 2).unwrap();
{
    let view = frame_buffer.try_take_latest().unwrap();
    assert_eq!((view.width(), view.height()), (2, 2));
    assert_eq!(view.pixels().len(), 16);
}
//dirty flag is consumed exactly once
assert!(frame_buffer.try_take_latest().is_none());
```
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use crate::frame::{Frame, Geometry, GeometryError, PixelFormat};

/// Rejection of a malformed publish.  The buffer is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PublishError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] GeometryError),
}

/// Counters describing what the buffer has seen since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameBufferStats {
    /// Successful calls to [FrameBuffer::publish].
    pub published: u64,
    /// Frames handed to the render loop.
    pub taken: u64,
    /// Frames overwritten before the render loop took them.
    pub dropped: u64,
    /// Publishes rejected as malformed.
    pub rejected: u64,
    /// Times the back storage was replaced because the geometry changed.
    pub reallocations: u64,
}

//guarded by the shared lock.  storage, geometry and dirty always change together.
#[derive(Debug)]
struct Back {
    storage: Vec<u8>,
    //None until the first publish
    geometry: Option<Geometry>,
    //geometry `storage` was allocated for.  Differs from `geometry` after a swap
    //handed us the render loop's old storage.
    allocated_for: Option<Geometry>,
    dirty: bool,
    published: u64,
    taken: u64,
    dropped: u64,
    reallocations: u64,
}

//only ever locked by the render loop
#[derive(Debug)]
struct Front {
    storage: Vec<u8>,
    geometry: Option<Geometry>,
}

/**
A synchronized double buffer holding the most recently published frame.

Share it between exactly one producer and one render loop, typically as an
`Arc<FrameBuffer>` handed out by [crate::ViewerSession].
*/
#[derive(Debug)]
pub struct FrameBuffer {
    back: Mutex<Back>,
    front: Mutex<Front>,
    rejected: AtomicU64,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Creates an empty buffer.  Nothing is allocated until the first publish.
    pub fn new() -> Self {
        FrameBuffer {
            back: Mutex::new(Back {
                storage: Vec::new(),
                geometry: None,
                allocated_for: None,
                dirty: false,
                published: 0,
                taken: 0,
                dropped: 0,
                reallocations: 0,
            }),
            front: Mutex::new(Front {
                storage: Vec::new(),
                geometry: None,
            }),
            rejected: AtomicU64::new(0),
        }
    }

    //a panic while holding the lock can only happen outside the copy/swap, so the
    //invariant still holds and the data is usable.
    fn lock_back(&self) -> MutexGuard<'_, Back> {
        self.back.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /**
    Publishes a new RGBA8888 frame, replacing any frame the render loop has not taken yet.

    `pixels` is copied; the caller keeps ownership.  Storage is reallocated only when
    `(width, height)` differs from the geometry the storage was allocated for.

    # Errors
    [PublishError::InvalidArgument] if `pixels.len() != width * height * 4` or either
    dimension is zero.  The previously published frame stays retrievable.
    */
    pub fn publish(&self, pixels: &[u8], width: u32, height: u32) -> Result<(), PublishError> {
        let geometry = match Geometry::new(width, height).validate(pixels.len(), PixelFormat::Rgba8888) {
            Ok(geometry) => geometry,
            Err(err) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                logwise::warn_sync!("FrameBuffer rejected publish: {err}", err = logwise::privacy::LogIt(&err));
                return Err(err.into());
            }
        };

        let (reallocated, dropped) = {
            let mut back = self.lock_back();
            let reallocated = back.allocated_for != Some(geometry);
            if reallocated {
                back.storage = pixels.to_vec();
                back.allocated_for = Some(geometry);
                back.reallocations += 1;
            } else {
                back.storage.copy_from_slice(pixels);
            }
            let dropped = back.dirty;
            if dropped {
                back.dropped += 1;
            }
            back.geometry = Some(geometry);
            back.dirty = true;
            back.published += 1;
            (reallocated, dropped)
        };

        if reallocated {
            logwise::info_sync!(
                "FrameBuffer storage reallocated for {geometry}",
                geometry = logwise::privacy::LogIt(&geometry)
            );
        }
        if dropped {
            logwise::trace_sync!("FrameBuffer overwrote an untaken frame");
        }
        Ok(())
    }

    /**
    Claims the latest frame if one was published since the last successful take.

    Returns `None` when there is nothing new; the render loop should skip all GPU work
    for this cycle.  Also returns `None` if a previous [FrameView] is still alive, since
    there is only one front buffer to hand out.

    The returned view borrows the render loop's front storage.  The producer may keep
    publishing while the view is alive; it writes to the other storage.
    */
    pub fn try_take_latest(&self) -> Option<FrameView<'_>> {
        let mut front = match self.front.try_lock() {
            Ok(front) => front,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                logwise::warn_sync!("FrameBuffer::try_take_latest called while a FrameView is still alive");
                return None;
            }
        };
        let geometry = {
            let mut back = self.lock_back();
            if !back.dirty {
                return None;
            }
            let geometry = back.geometry?;
            let front = &mut *front;
            std::mem::swap(&mut front.storage, &mut back.storage);
            //the back storage is now whatever the render loop held before
            back.allocated_for = front.geometry;
            back.dirty = false;
            back.taken += 1;
            geometry
        };
        front.geometry = Some(geometry);
        debug_assert_eq!(front.storage.len(), geometry.pixel_count() * PixelFormat::Rgba8888.bytes_per_pixel());
        Some(FrameView { front, geometry })
    }

    /**
    Like [Self::try_take_latest], but copies the frame out so it can be kept past the
    current draw cycle.
    */
    pub fn take_latest_copy(&self) -> Option<Frame> {
        self.try_take_latest().map(|view| view.to_frame())
    }

    /// Whether a frame is waiting to be taken.  Does not consume it.
    pub fn has_pending(&self) -> bool {
        self.lock_back().dirty
    }

    /// Geometry of the most recently published frame, if any.
    pub fn geometry(&self) -> Option<Geometry> {
        self.lock_back().geometry
    }

    pub fn stats(&self) -> FrameBufferStats {
        let back = self.lock_back();
        FrameBufferStats {
            published: back.published,
            taken: back.taken,
            dropped: back.dropped,
            rejected: self.rejected.load(Ordering::Relaxed),
            reallocations: back.reallocations,
        }
    }
}

/**
A read-only view of the frame claimed by [FrameBuffer::try_take_latest].

Valid for the current draw cycle only: drop it before the next take.
*/
pub struct FrameView<'a> {
    front: MutexGuard<'a, Front>,
    geometry: Geometry,
}

impl FrameView<'_> {
    pub fn pixels(&self) -> &[u8] {
        &self.front.storage
    }
    pub fn width(&self) -> u32 {
        self.geometry.width
    }
    pub fn height(&self) -> u32 {
        self.geometry.height
    }
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }
    pub fn format(&self) -> PixelFormat {
        PixelFormat::Rgba8888
    }

    /// Copies the view into an owned [Frame].
    pub fn to_frame(&self) -> Frame {
        Frame::new(self.front.storage.clone(), self.geometry.width, self.geometry.height)
            .unwrap_or_else(|err| unreachable!("FrameBuffer storage disagrees with its geometry: {err}"))
    }
}

impl std::fmt::Debug for FrameView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameView")
            .field("geometry", &self.geometry)
            .field("byte_len", &self.front.storage.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(geometry: Geometry, value: u8) -> Vec<u8> {
        vec![value; geometry.pixel_count() * 4]
    }

    #[test]
    fn same_geometry_reuses_storage() {
        let fb = FrameBuffer::new();
        let g = Geometry::new(4, 4);
        for i in 0..10 {
            fb.publish(&solid(g, i), 4, 4).unwrap();
            let view = fb.try_take_latest().unwrap();
            assert!(view.pixels().iter().all(|p| *p == i));
        }
        //one allocation per side of the double buffer
        assert_eq!(fb.stats().reallocations, 2);
    }

    #[test]
    fn swapped_storage_of_old_geometry_is_replaced() {
        let fb = FrameBuffer::new();
        fb.publish(&solid(Geometry::new(8, 8), 1), 8, 8).unwrap();
        drop(fb.try_take_latest().unwrap());
        fb.publish(&solid(Geometry::new(2, 2), 2), 2, 2).unwrap();
        drop(fb.try_take_latest().unwrap());
        //back now holds the 8x8 storage; publishing 2x2 must not reuse it
        fb.publish(&solid(Geometry::new(2, 2), 3), 2, 2).unwrap();
        let view = fb.try_take_latest().unwrap();
        assert_eq!(view.pixels().len(), 2 * 2 * 4);
        assert!(view.pixels().iter().all(|p| *p == 3));
    }

    #[test]
    fn live_view_blocks_second_take() {
        let fb = FrameBuffer::new();
        fb.publish(&solid(Geometry::new(1, 1), 9), 1, 1).unwrap();
        let view = fb.try_take_latest().unwrap();
        fb.publish(&solid(Geometry::new(1, 1), 10), 1, 1).unwrap();
        assert!(fb.try_take_latest().is_none());
        assert_eq!(view.pixels(), &[9, 9, 9, 9]);
        drop(view);
        //the pending frame was not consumed by the refused take
        assert_eq!(fb.try_take_latest().unwrap().pixels(), &[10, 10, 10, 10]);
    }

    #[test]
    fn has_pending_does_not_consume() {
        let fb = FrameBuffer::new();
        assert!(!fb.has_pending());
        fb.publish(&[0; 4], 1, 1).unwrap();
        assert!(fb.has_pending());
        assert!(fb.has_pending());
        assert!(fb.try_take_latest().is_some());
        assert!(!fb.has_pending());
    }
}
