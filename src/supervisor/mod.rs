//! Sink lifecycle supervisor.
//!
//! `Supervisor` owns the externally visible frame queue and exactly one
//! active [`Sink`]. A single control loop selects over three sources: inbound
//! frames, the rotate signal and the terminate signal. Rotation closes the
//! active sink, which drains it, before a replacement is opened with the
//! same formatter, so two sinks never write at once and already queued frames
//! keep their order. A failed reopen ends the loop; the previous sink is
//! already closed and is not reused.
//!
//! The loop runs while its [`SupervisorState`] is non-terminal and only
//! rotates from `Forwarding`.

mod state;

use std::sync::Arc;

use crossbeam_channel::{never, select};
use log::{debug, error, info};

pub use state::{ControlEvent, SupervisorState};

use crate::{
    config::OutputConfig,
    error::OutputError,
    formatter::SharedFormatter,
    frame::Frame,
    output::Output,
    queue::{FrameReceiver, FrameSender, frame_queue},
    signals::SignalSources,
    sink::Sink,
    transport::{SyslogOpener, TransportOpener},
    worker::{LoopState, RunLoop},
};

/// Output that forwards to a replaceable [`Sink`].
pub struct Supervisor {
    sender: FrameSender,
    state: LoopState<ControlLoop>,
}

struct ControlLoop {
    inbound: FrameReceiver,
    sink: Sink,
    formatter: SharedFormatter,
    opener: Arc<dyn TransportOpener>,
    signals: SignalSources,
    capacity: usize,
    state: SupervisorState,
}

enum Wake {
    Frame(Frame),
    QueueClosed,
    Rotate,
    Terminate,
    RotateSourceGone,
    TerminateSourceGone,
}

impl ControlLoop {
    fn transition(&mut self, event: ControlEvent) {
        let next = self.state.next(event);
        if next != self.state {
            debug!("Supervisor: {:?} -> {:?} on {event:?}", self.state, next);
        }
        self.state = next;
    }

    fn wait(&self) -> Wake {
        select! {
            recv(self.inbound.frames()) -> frame => match frame {
                Ok(frame) => Wake::Frame(frame),
                Err(_) => Wake::QueueClosed,
            },
            recv(self.inbound.closed()) -> _ => Wake::QueueClosed,
            recv(self.signals.rotate) -> msg => match msg {
                Ok(()) => Wake::Rotate,
                Err(_) => Wake::RotateSourceGone,
            },
            recv(self.signals.terminate) -> msg => match msg {
                Ok(()) => Wake::Terminate,
                Err(_) => Wake::TerminateSourceGone,
            },
        }
    }

    /// Push `frame` to the active sink, surfacing the sink's own failure if
    /// its loop has already exited.
    fn forward(&mut self, frame: Frame) -> Result<(), OutputError> {
        if self.sink.channel().send(frame).is_ok() {
            return Ok(());
        }
        self.transition(ControlEvent::Failed);
        match self.sink.close() {
            Err(err) => Err(err),
            Ok(()) => Err(OutputError::Closed),
        }
    }

    /// Close the active sink, then open and start a replacement.
    fn rotate(&mut self) -> Result<(), OutputError> {
        if self.state != SupervisorState::Forwarding {
            debug!("Supervisor: rotate ignored in {:?}", self.state);
            return Ok(());
        }
        self.transition(ControlEvent::RotateRequested);
        info!("Supervisor: rotating sink");
        if let Err(err) = self.sink.close() {
            self.transition(ControlEvent::Failed);
            return Err(err);
        }
        let mut fresh = match Sink::open(self.formatter.clone(), self.opener.as_ref(), self.capacity)
        {
            Ok(sink) => sink,
            Err(err) => {
                error!("Supervisor: reopen failed: {err}");
                self.transition(ControlEvent::Failed);
                return Err(err);
            }
        };
        fresh.start()?;
        self.sink = fresh;
        self.transition(ControlEvent::RotateSucceeded);
        Ok(())
    }

    /// Forward what is left in the inbound queue and close the sink.
    fn finish(&mut self) -> Result<(), OutputError> {
        let remaining: Vec<Frame> = self.inbound.drain().collect();
        for frame in remaining {
            self.forward(frame)?;
        }
        self.sink.close()?;
        self.transition(ControlEvent::QueueClosed);
        Ok(())
    }

    /// Stop at once, leaving the active sink's queue undrained.
    fn terminate(mut self) -> Result<(), OutputError> {
        self.transition(ControlEvent::TerminateRequested);
        let ControlLoop { sink, .. } = self;
        sink.abandon();
        Err(OutputError::Terminated)
    }
}

impl RunLoop for ControlLoop {
    const NAME: &'static str = "Supervisor";

    fn run(mut self) -> Result<(), OutputError> {
        self.sink.start()?;
        while !self.state.is_terminal() {
            match self.wait() {
                Wake::Frame(frame) => {
                    self.forward(frame)?;
                    self.transition(ControlEvent::FrameForwarded);
                }
                Wake::QueueClosed => self.finish()?,
                Wake::Rotate => self.rotate()?,
                Wake::Terminate => return self.terminate(),
                Wake::RotateSourceGone => self.signals.rotate = never(),
                Wake::TerminateSourceGone => self.signals.terminate = never(),
            }
        }
        Ok(())
    }
}

impl Supervisor {
    /// Open the initial sink through `opener`.
    pub fn open<O>(
        formatter: SharedFormatter,
        opener: O,
        signals: SignalSources,
        config: &OutputConfig,
    ) -> Result<Self, OutputError>
    where
        O: TransportOpener + 'static,
    {
        config.validate()?;
        let opener: Arc<dyn TransportOpener> = Arc::new(opener);
        let sink = Sink::open(formatter.clone(), opener.as_ref(), config.capacity)?;
        let (sender, inbound) = frame_queue(config.capacity);
        Ok(Self {
            sender,
            state: LoopState::new(ControlLoop {
                inbound,
                sink,
                formatter,
                opener,
                signals,
                capacity: config.capacity,
                state: SupervisorState::Forwarding,
            }),
        })
    }

    /// Open a supervisor writing to the syslog destination in `config`.
    pub fn syslog(
        formatter: SharedFormatter,
        signals: SignalSources,
        config: &OutputConfig,
    ) -> Result<Self, OutputError> {
        let opener = SyslogOpener::new(config.syslog.clone());
        Self::open(formatter, opener, signals, config)
    }
}

impl Output for Supervisor {
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

impl Drop for Supervisor {
    fn drop(&mut self) {
        if self.state.is_finished() {
            return;
        }
        if let Err(err) = self.close() {
            log::warn!("Supervisor: control loop ended with error during drop: {err}");
        }
    }
}
