//! The capability shared by every output variant.
//!
//! [`Sink`] and [`Supervisor`] both satisfy [`Output`], so a caller can
//! compose either without knowing which one it holds. [`SelectedOutput`]
//! carries the variant chosen at construction time.

use crate::{error::OutputError, queue::FrameSender, sink::Sink, supervisor::Supervisor};

/// Lifecycle contract for a frame consumer.
pub trait Output: Send {
    /// Queue producers push frames into.
    fn channel(&self) -> FrameSender;

    /// Drive the output on the calling thread until its queue is closed.
    fn run(&mut self) -> Result<(), OutputError>;

    /// Drive the output on a dedicated worker thread.
    fn start(&mut self) -> Result<(), OutputError>;

    /// Close the queue and block until every queued frame is processed.
    ///
    /// Returns the run loop's failure, if it ended with one.
    fn close(&mut self) -> Result<(), OutputError>;
}

/// Output variant selected when the pipeline is assembled.
pub enum SelectedOutput {
    /// Syslog destination with rotate and terminate handling.
    Syslog(Supervisor),
    /// Formatted text written to a stream.
    Stream(Sink),
}

impl SelectedOutput {
    fn inner(&self) -> &dyn Output {
        match self {
            SelectedOutput::Syslog(supervisor) => supervisor,
            SelectedOutput::Stream(sink) => sink,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Output {
        match self {
            SelectedOutput::Syslog(supervisor) => supervisor,
            SelectedOutput::Stream(sink) => sink,
        }
    }
}

impl Output for SelectedOutput {
    fn channel(&self) -> FrameSender {
        self.inner().channel()
    }

    fn run(&mut self) -> Result<(), OutputError> {
        self.inner_mut().run()
    }

    fn start(&mut self) -> Result<(), OutputError> {
        self.inner_mut().start()
    }

    fn close(&mut self) -> Result<(), OutputError> {
        self.inner_mut().close()
    }
}
