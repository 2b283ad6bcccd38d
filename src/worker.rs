//! Lifecycle of a run loop owned by an output.
//!
//! A loop starts `Idle`. It either runs on the caller's thread or is
//! spawned onto a named worker thread, which reports the loop's outcome over
//! a completion channel before exiting. Waiting for completion joins the
//! thread and hands the outcome to the caller exactly once.

use std::{
    mem,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, bounded};
use log::warn;

use crate::error::OutputError;

/// A blocking loop that consumes its state when run.
pub(crate) trait RunLoop: Send + 'static {
    /// Thread name and log prefix.
    const NAME: &'static str;

    fn run(self) -> Result<(), OutputError>;
}

pub(crate) enum LoopState<L> {
    Idle(L),
    Running {
        done_rx: Receiver<Result<(), OutputError>>,
        handle: JoinHandle<()>,
    },
    Finished,
}

impl<L: RunLoop> LoopState<L> {
    pub(crate) fn new(run_loop: L) -> Self {
        LoopState::Idle(run_loop)
    }

    pub(crate) fn is_finished(&self) -> bool {
        matches!(self, LoopState::Finished)
    }

    /// Run the loop on the calling thread until it returns.
    pub(crate) fn run_inline(&mut self) -> Result<(), OutputError> {
        match mem::replace(self, LoopState::Finished) {
            LoopState::Idle(run_loop) => run_loop.run(),
            running @ LoopState::Running { .. } => {
                *self = running;
                Err(OutputError::AlreadyStarted)
            }
            LoopState::Finished => Err(OutputError::AlreadyStarted),
        }
    }

    /// Spawn the loop on a dedicated worker thread.
    pub(crate) fn spawn(&mut self) -> Result<(), OutputError> {
        let run_loop = match mem::replace(self, LoopState::Finished) {
            LoopState::Idle(run_loop) => run_loop,
            other => {
                *self = other;
                return Err(OutputError::AlreadyStarted);
            }
        };
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name(L::NAME.to_owned())
            .spawn(move || {
                let _ = done_tx.send(run_loop.run());
            })
            .map_err(OutputError::Spawn)?;
        *self = LoopState::Running { done_rx, handle };
        Ok(())
    }

    /// Block until the loop has exited and return its outcome.
    ///
    /// An idle loop is run inline so its queue still drains. Later calls
    /// return `Ok(())`.
    pub(crate) fn wait(&mut self) -> Result<(), OutputError> {
        match mem::replace(self, LoopState::Finished) {
            LoopState::Idle(run_loop) => run_loop.run(),
            LoopState::Running { done_rx, handle } => {
                let outcome = done_rx.recv();
                if handle.join().is_err() {
                    warn!("{}: worker thread panicked", L::NAME);
                }
                outcome.unwrap_or(Err(OutputError::WorkerPanicked(L::NAME)))
            }
            LoopState::Finished => Ok(()),
        }
    }

    /// Stop tracking a running loop without waiting for it.
    pub(crate) fn detach(&mut self) {
        if let LoopState::Running { .. } = mem::replace(self, LoopState::Finished) {
            warn!("{}: detached from running worker without draining", L::NAME);
        }
    }
}
