//! Bounded frame queue with an explicit close.
//!
//! Producers push through a cloneable [`FrameSender`]; a single consumer
//! pulls through [`FrameReceiver`]. A full queue blocks the producer, which is
//! the only backpressure in the pipeline. Closing the queue rejects further
//! pushes while the consumer drains whatever was already queued, in order.
//! Dropping every sender closes the queue as well.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, select};

use crate::{error::OutputError, frame::Frame};

struct QueueState {
    closed: AtomicBool,
    // Carries the single wake-up sent by `close`.
    close_tx: Sender<()>,
}

/// Producer handle for a frame queue.
#[derive(Clone)]
pub struct FrameSender {
    frames: Sender<Frame>,
    state: Arc<QueueState>,
}

/// Consumer handle for a frame queue.
pub struct FrameReceiver {
    frames: Receiver<Frame>,
    closed: Receiver<()>,
    state: Arc<QueueState>,
}

/// Create a queue holding at most `capacity` frames.
pub fn frame_queue(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (frames_tx, frames_rx) = bounded(capacity);
    let (close_tx, close_rx) = bounded(1);
    let state = Arc::new(QueueState {
        closed: AtomicBool::new(false),
        close_tx,
    });
    (
        FrameSender {
            frames: frames_tx,
            state: Arc::clone(&state),
        },
        FrameReceiver {
            frames: frames_rx,
            closed: close_rx,
            state,
        },
    )
}

impl FrameSender {
    /// Push a frame, blocking while the queue is full.
    ///
    /// Fails with [`OutputError::Closed`] once the queue has been closed or
    /// its consumer has exited.
    pub fn send(&self, frame: Frame) -> Result<(), OutputError> {
        if self.is_closed() {
            return Err(OutputError::Closed);
        }
        self.frames.send(frame).map_err(|_| OutputError::Closed)
    }

    /// Push a frame without blocking.
    ///
    /// Returns the frame back when the queue is full.
    pub fn try_send(&self, frame: Frame) -> Result<(), TrySendError<Frame>> {
        if self.is_closed() {
            return Err(TrySendError::Disconnected(frame));
        }
        self.frames.try_send(frame)
    }

    /// Reject further pushes and let the consumer finish draining.
    ///
    /// Idempotent.
    pub fn close(&self) {
        if !self.state.closed.swap(true, Ordering::SeqCst) {
            let _ = self.state.close_tx.try_send(());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Number of frames waiting in the queue.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.frames.capacity()
    }
}

impl FrameReceiver {
    /// Receive the next frame in FIFO order.
    ///
    /// Blocks while the queue is open and empty. Returns `None` once the
    /// queue is closed and drained, or every sender is gone.
    pub fn recv(&self) -> Option<Frame> {
        if self.is_closed() {
            return self.frames.try_recv().ok();
        }
        select! {
            recv(self.frames) -> frame => frame.ok(),
            recv(self.closed) -> _ => self.frames.try_recv().ok(),
        }
    }

    /// Frames still queued, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.try_iter()
    }

    /// Channel carrying frames, for use in a `select!`.
    pub(crate) fn frames(&self) -> &Receiver<Frame> {
        &self.frames
    }

    /// Channel that becomes ready once the queue closes.
    pub(crate) fn closed(&self) -> &Receiver<()> {
        &self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}
