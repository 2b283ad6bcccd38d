//! Leaf output: decode, format and write each frame.
//!
//! `Sink` owns one transport handle and a formatter. Its run loop pulls
//! frames in arrival order and stops at the first failure; decode, format and
//! write errors are never retried and no frame is skipped. The failure is
//! logged and returned to whoever owns the loop. An abandoned sink writes
//! nothing further, even with frames still queued.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use log::{debug, error, warn};

use crate::{
    error::OutputError,
    formatter::SharedFormatter,
    frame::decode_frame,
    output::Output,
    queue::{FrameReceiver, FrameSender, frame_queue},
    transport::{LogTransport, TransportOpener},
    worker::{LoopState, RunLoop},
};

/// Output writing formatted frames to a single transport handle.
pub struct Sink {
    sender: FrameSender,
    abandoned: Arc<AtomicBool>,
    state: LoopState<SinkLoop>,
}

struct SinkLoop {
    receiver: FrameReceiver,
    transport: Box<dyn LogTransport>,
    formatter: SharedFormatter,
    abandoned: Arc<AtomicBool>,
}

impl SinkLoop {
    fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    fn process(&mut self, frame: &[u8]) -> Result<(), OutputError> {
        let event = decode_frame(frame)?;
        let record = self.formatter.format(&event).ok_or(OutputError::Format)?;
        if self.is_abandoned() {
            return Ok(());
        }
        self.transport
            .write_record(&record)
            .map_err(OutputError::Write)
    }
}

impl RunLoop for SinkLoop {
    const NAME: &'static str = "Sink";

    fn run(mut self) -> Result<(), OutputError> {
        while let Some(frame) = self.receiver.recv() {
            if self.is_abandoned() {
                debug!("Sink: abandoned; discarding queued frames");
                return Ok(());
            }
            if let Err(err) = self.process(&frame) {
                error!("Sink: {err}; no further frames will be written");
                return Err(err);
            }
        }
        debug!("Sink: queue closed and drained");
        Ok(())
    }
}

impl Sink {
    /// Open a transport handle from `opener` and allocate the inbound queue.
    ///
    /// Fails with [`OutputError::TransportOpen`] when the destination is
    /// unavailable.
    pub fn open(
        formatter: SharedFormatter,
        opener: &dyn TransportOpener,
        capacity: usize,
    ) -> Result<Self, OutputError> {
        if capacity == 0 {
            return Err(OutputError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ));
        }
        let transport = opener.open().map_err(OutputError::TransportOpen)?;
        Self::with_transport(formatter, transport, capacity)
    }

    /// Build a sink around an already open transport.
    pub fn with_transport(
        formatter: SharedFormatter,
        transport: Box<dyn LogTransport>,
        capacity: usize,
    ) -> Result<Self, OutputError> {
        if capacity == 0 {
            return Err(OutputError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ));
        }
        let (sender, receiver) = frame_queue(capacity);
        let abandoned = Arc::new(AtomicBool::new(false));
        Ok(Self {
            sender,
            abandoned: Arc::clone(&abandoned),
            state: LoopState::new(SinkLoop {
                receiver,
                transport,
                formatter,
                abandoned,
            }),
        })
    }

    /// Walk away from a running loop without closing or draining its queue.
    ///
    /// A write already in progress completes; queued frames are discarded.
    pub fn abandon(mut self) {
        self.abandoned.store(true, Ordering::SeqCst);
        self.state.detach();
    }
}

impl Output for Sink {
    fn channel(&self) -> FrameSender {
        self.sender.clone()
    }

    fn run(&mut self) -> Result<(), OutputError> {
        self.state.run_inline()
    }

    fn start(&mut self) -> Result<(), OutputError> {
        self.state.spawn()
    }

    fn close(&mut self) -> Result<(), OutputError> {
        self.sender.close();
        self.state.wait()
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        if self.state.is_finished() {
            return;
        }
        if let Err(err) = self.close() {
            warn!("Sink: run loop ended with error during drop: {err}");
        }
    }
}
