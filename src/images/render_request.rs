// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The "please draw" signal between the producer and the render loop.

The render loop does not poll the [crate::FrameBuffer].  It sleeps until a producer
marks the request pending, draws once, and goes back to sleep.  Several requests raised
while the loop is busy collapse into one wakeup.

This differs from a channel in that there is nothing to receive: the signal only says
"something may be new", and the frame buffer decides what that something is.
*/

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use crate::sys::time::Duration;

#[derive(Debug, Default)]
struct State {
    pending: bool,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What woke a waiting render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// A render was requested.  The pending flag has been consumed.
    Render,
    /// The request was closed; the render loop should exit.
    Closed,
    /// [RenderRequest::wait_timeout] elapsed with nothing requested.
    TimedOut,
}

/**
A cloneable handle to a shared render request flag.

Producers call [RenderRequest::request]; the render loop calls [RenderRequest::wait].
*/
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    shared: Arc<Shared>,
}

impl RenderRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a render as pending and wakes the render loop.  Ignored once closed.
    pub fn request(&self) {
        let mut state = self.shared.lock();
        if state.closed {
            return;
        }
        state.pending = true;
        drop(state);
        self.shared.wake.notify_one();
    }

    /// Whether a render is pending.  Does not consume it.
    pub fn is_pending(&self) -> bool {
        self.shared.lock().pending
    }

    /**
    Closes the request.  Waiters wake with [Wakeup::Closed] and later requests are ignored.

    Close after the producer has stopped, so no frame is published into a buffer nobody
    will draw.
    */
    pub fn close(&self) {
        let mut state = self.shared.lock();
        state.closed = true;
        state.pending = false;
        drop(state);
        self.shared.wake.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Blocks until a render is requested or the request is closed.
    pub fn wait(&self) -> Wakeup {
        let guard = self.shared.lock();
        let mut state = self
            .shared
            .wake
            .wait_while(guard, |state| !state.pending && !state.closed)
            .unwrap_or_else(PoisonError::into_inner);
        Self::consume(&mut state)
    }

    /// Like [Self::wait], but gives up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Wakeup {
        let guard = self.shared.lock();
        let (mut state, result) = self
            .shared
            .wake
            .wait_timeout_while(guard, timeout, |state| !state.pending && !state.closed)
            .unwrap_or_else(PoisonError::into_inner);
        if result.timed_out() && !state.pending && !state.closed {
            return Wakeup::TimedOut;
        }
        Self::consume(&mut state)
    }

    fn consume(state: &mut State) -> Wakeup {
        if state.closed {
            Wakeup::Closed
        } else {
            state.pending = false;
            Wakeup::Render
        }
    }
}
