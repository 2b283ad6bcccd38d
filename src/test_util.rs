//! In-memory transports and frame helpers for integration tests.
//!
//! [`MemoryOpener`] hands out transports that record every write together
//! with the generation of the handle that performed it, so tests can tell
//! which sink instance wrote which record. Opens and writes can be made to
//! fail on demand.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;

use crate::{
    event::CaptureEvent,
    formatter::SharedFormatter,
    frame::{Frame, encode_event},
    transport::{LogTransport, TransportOpener},
};

/// A record captured by a [`MemoryOpener`] transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Written {
    /// 1 for the first handle opened, 2 for the next, and so on.
    pub generation: usize,
    pub record: Vec<u8>,
}

#[derive(Default)]
struct MemoryState {
    written: Mutex<Vec<Written>>,
    opens: AtomicUsize,
    fail_opens: AtomicBool,
    fail_writes: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

/// Opener whose transports append to shared memory.
#[derive(Clone, Default)]
pub struct MemoryOpener {
    state: Arc<MemoryState>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record written so far, in write order.
    pub fn written(&self) -> Vec<Written> {
        self.state.written.lock().clone()
    }

    /// Written records as UTF-8 strings.
    pub fn lines(&self) -> Vec<String> {
        self.written()
            .into_iter()
            .map(|w| String::from_utf8_lossy(&w.record).into_owned())
            .collect()
    }

    /// Number of successful opens.
    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn fail_opens(&self, fail: bool) {
        self.state.fail_opens.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Sleep for `delay` before each write, to keep sinks busy.
    pub fn set_write_delay(&self, delay: Duration) {
        *self.state.write_delay.lock() = Some(delay);
    }
}

struct MemoryTransport {
    generation: usize,
    state: Arc<MemoryState>,
}

impl LogTransport for MemoryTransport {
    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        if self.state.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "syslog went away"));
        }
        let delay = *self.state.write_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.state.written.lock().push(Written {
            generation: self.generation,
            record: record.to_vec(),
        });
        Ok(())
    }
}

impl TransportOpener for MemoryOpener {
    fn open(&self) -> io::Result<Box<dyn LogTransport>> {
        if self.state.fail_opens.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "syslog socket unavailable",
            ));
        }
        let generation = self.state.opens.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(MemoryTransport {
            generation,
            state: Arc::clone(&self.state),
        }))
    }
}

/// Encode an event carrying only `identity`.
pub fn identity_frame(identity: &str) -> Frame {
    encode_event(&CaptureEvent {
        identity: Some(identity.to_owned()),
        ..CaptureEvent::default()
    })
    .expect("encoding a plain event cannot fail")
}

/// Formatter that renders the event identity and remembers each call.
#[derive(Clone, Default)]
pub struct IdentityFormatter {
    seen: Arc<Mutex<Vec<String>>>,
}

impl IdentityFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identities observed so far, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    /// Shared handle for passing to outputs.
    ///
    /// Events without an identity fail to format.
    pub fn shared(&self) -> SharedFormatter {
        let seen = Arc::clone(&self.seen);
        SharedFormatter::new(move |event: &CaptureEvent| {
            let identity = event.identity.clone()?;
            seen.lock().push(identity.clone());
            Some(identity.into_bytes())
        })
    }
}
