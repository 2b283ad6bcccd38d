//! Rotate and terminate signal sources.
//!
//! The supervisor never reads process-global signal state. It receives a
//! [`SignalSources`] pair of channels; [`install`] feeds those channels from
//! OS signals, while [`SignalSources::channels`] hands tests manual triggers.
//!
//! Each channel holds a single pending request. A signal that arrives while
//! one is already pending is coalesced into it.

use std::{
    io,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, bounded, never};
use log::{debug, info};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::{Handle, Signals},
};

/// Receiving side consumed by the supervisor's control loop.
pub struct SignalSources {
    pub(crate) rotate: Receiver<()>,
    pub(crate) terminate: Receiver<()>,
}

/// Sending side used to request rotation or termination.
#[derive(Clone)]
pub struct SignalTriggers {
    rotate: Sender<()>,
    terminate: Sender<()>,
}

impl SignalSources {
    /// Connected triggers and sources.
    pub fn channels() -> (SignalTriggers, SignalSources) {
        let (rotate_tx, rotate_rx) = bounded(1);
        let (terminate_tx, terminate_rx) = bounded(1);
        (
            SignalTriggers {
                rotate: rotate_tx,
                terminate: terminate_tx,
            },
            SignalSources {
                rotate: rotate_rx,
                terminate: terminate_rx,
            },
        )
    }

    /// Sources that never fire.
    pub fn none() -> SignalSources {
        SignalSources {
            rotate: never(),
            terminate: never(),
        }
    }
}

impl SignalTriggers {
    /// Request a sink reopen. Returns `false` if one is already pending or
    /// the supervisor has gone.
    pub fn rotate(&self) -> bool {
        self.rotate.try_send(()).is_ok()
    }

    /// Request immediate termination.
    pub fn terminate(&self) -> bool {
        self.terminate.try_send(()).is_ok()
    }
}

/// OS signal listener forwarding into [`SignalSources`].
///
/// SIGHUP requests rotation; SIGINT and SIGTERM request termination.
pub struct OsSignals {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

/// Register the process signal handlers and start the forwarding thread.
pub fn install() -> io::Result<(OsSignals, SignalSources)> {
    let (triggers, sources) = SignalSources::channels();
    let mut signals = Signals::new([SIGHUP, SIGINT, SIGTERM])?;
    let handle = signals.handle();
    let thread = thread::Builder::new()
        .name("signal-forwarder".to_owned())
        .spawn(move || {
            for signal in signals.forever() {
                match signal {
                    SIGHUP => {
                        info!("SIGHUP received, reopening log transport");
                        triggers.rotate();
                    }
                    other => {
                        info!("signal {other} received, terminating");
                        triggers.terminate();
                    }
                }
            }
            debug!("signal forwarder exiting");
        })?;
    Ok((
        OsSignals {
            handle,
            thread: Some(thread),
        },
        sources,
    ))
}

impl Drop for OsSignals {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
