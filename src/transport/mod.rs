//! Write sinks for formatted records.
//!
//! A sink owns one [`LogTransport`] at a time and obtains it from a
//! [`TransportOpener`], which the supervisor calls again on every rotation.
//! Openers are plain values so tests can substitute in-memory transports or
//! inject open failures.

use std::io;

mod syslog;
mod writer;

pub use syslog::{SyslogOpener, SyslogTransport};
pub use writer::WriterTransport;

/// Destination a sink writes formatted records to.
pub trait LogTransport: Send {
    /// Write one formatted record.
    fn write_record(&mut self, record: &[u8]) -> io::Result<()>;
}

impl<T> LogTransport for Box<T>
where
    T: LogTransport + ?Sized,
{
    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        (**self).write_record(record)
    }
}

/// Acquires fresh transport handles.
pub trait TransportOpener: Send + Sync {
    /// Open a new handle to the destination.
    fn open(&self) -> io::Result<Box<dyn LogTransport>>;
}

impl<F> TransportOpener for F
where
    F: Fn() -> io::Result<Box<dyn LogTransport>> + Send + Sync,
{
    fn open(&self) -> io::Result<Box<dyn LogTransport>> {
        self()
    }
}
