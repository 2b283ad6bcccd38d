//! Error taxonomy shared by every output.
//!
//! Sinks never terminate the process themselves. Each failure is returned
//! to the owner of the run loop, which decides the process outcome via
//! [`OutputError::exit_code`].

use std::io;

use thiserror::Error;

/// Errors raised while opening, running or closing an output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The log transport could not be opened or reopened.
    #[error("transport open failed: {0}")]
    TransportOpen(#[source] io::Error),
    /// A frame was not a well-formed capture event.
    #[error("frame decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    /// The formatter reported failure for a decoded event.
    #[error("text format function failed")]
    Format,
    /// Writing a formatted record to the transport failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    /// The queue is closed or its consumer has exited.
    #[error("queue closed")]
    Closed,
    /// Invalid user supplied configuration.
    #[error("invalid output configuration: {0}")]
    InvalidConfig(String),
    /// The terminate signal ended the control loop.
    #[error("terminated by signal")]
    Terminated,
    /// The run loop was already started or has finished.
    #[error("run loop already started")]
    AlreadyStarted,
    /// The worker thread for a run loop could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
    /// A run loop thread panicked before reporting completion.
    #[error("{0} worker thread panicked")]
    WorkerPanicked(&'static str),
}

impl OutputError {
    /// Process exit status for a run loop that ended with this error.
    ///
    /// A terminate request is a normal way to stop, so it maps to `0`.
    pub fn exit_code(&self) -> i32 {
        match self {
            OutputError::Terminated => 0,
            _ => 1,
        }
    }

    /// Whether this error came from (re)opening the transport.
    pub fn is_transport_open(&self) -> bool {
        matches!(self, OutputError::TransportOpen(_))
    }
}
