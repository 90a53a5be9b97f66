// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Frame timing and counts, readable from any thread while the render loop runs.
*/

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use crate::bittricks::{u32s_to_u64, u64_to_u32s};
use crate::frame::Geometry;
use crate::sys::time::{Duration, Instant};

//number of recent draws averaged for fps
const MAX_HISTORY: usize = 60;

#[derive(Debug)]
struct ReporterImpl {
    history: Mutex<VecDeque<Instant>>,
    drawn: AtomicU64,
    skipped: AtomicU64,
    //0 means no frame yet; geometries are never empty
    last_geometry: AtomicU64,
}

/**
Reports what the render loop has been doing.

Cheap to clone; every clone observes the same loop.
*/
#[derive(Debug, Clone)]
pub struct FrameReporter {
    imp: Arc<ReporterImpl>,
}

impl Default for FrameReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReporter {
    pub fn new() -> Self {
        Self {
            imp: Arc::new(ReporterImpl {
                history: Mutex::new(VecDeque::with_capacity(MAX_HISTORY)),
                drawn: AtomicU64::new(0),
                skipped: AtomicU64::new(0),
                last_geometry: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_draw(&self, geometry: Geometry) {
        self.record_draw_at(geometry, Instant::now());
    }

    fn record_draw_at(&self, geometry: Geometry, at: Instant) {
        {
            let mut history = self.imp.history.lock().unwrap_or_else(PoisonError::into_inner);
            history.push_back(at);
            while history.len() > MAX_HISTORY {
                history.pop_front();
            }
        }
        self.imp
            .last_geometry
            .store(u32s_to_u64(geometry.width, geometry.height), Ordering::Relaxed);
        self.imp.drawn.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skip(&self) {
        self.imp.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Draw cycles that uploaded and drew a frame.
    pub fn drawn(&self) -> u64 {
        self.imp.drawn.load(Ordering::Relaxed)
    }

    /// Draw cycles that found nothing new and did no GPU work.
    pub fn skipped(&self) -> u64 {
        self.imp.skipped.load(Ordering::Relaxed)
    }

    /// Geometry of the frame most recently drawn.
    pub fn last_geometry(&self) -> Option<Geometry> {
        match self.imp.last_geometry.load(Ordering::Relaxed) {
            0 => None,
            packed => {
                let (width, height) = u64_to_u32s(packed);
                Some(Geometry::new(width, height))
            }
        }
    }

    /**
    Frames per second over the last 60 draws.

    Returns `None` until two draws have been recorded.
    */
    pub fn fps(&self) -> Option<f64> {
        let history = self.imp.history.lock().unwrap_or_else(PoisonError::into_inner);
        let (first, last) = (history.front()?, history.back()?);
        let elapsed: Duration = last.duration_since(*first);
        if history.len() < 2 || elapsed.is_zero() {
            return None;
        }
        Some((history.len() - 1) as f64 / elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_geometry() {
        let reporter = FrameReporter::new();
        assert_eq!(reporter.last_geometry(), None);
        assert_eq!(reporter.fps(), None);
        reporter.record_skip();
        reporter.clone().record_draw(Geometry::new(640, 480));
        assert_eq!(reporter.drawn(), 1);
        assert_eq!(reporter.skipped(), 1);
        assert_eq!(reporter.last_geometry(), Some(Geometry::new(640, 480)));
    }

    #[test]
    fn fps_over_window() {
        let reporter = FrameReporter::new();
        let start = Instant::now();
        //100 draws at 10ms; only the last 60 count
        for i in 0..100 {
            reporter.record_draw_at(Geometry::new(1, 1), start + Duration::from_millis(i * 10));
        }
        let fps = reporter.fps().unwrap();
        assert!((fps - 100.0).abs() < 0.01, "fps was {fps}");
    }
}
