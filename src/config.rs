//! Configuration structures for sinks and the supervisor.
//!
//! The queue capacity is shared across the system: the supervisor and every
//! sink it opens allocate their inbound queues with the same value. Syslog
//! priority and tag settings live in [`SyslogConfig`] so a reopened transport
//! always targets the same destination.

use std::path::PathBuf;

use crate::error::OutputError;

/// Default bounded queue capacity for frames awaiting processing.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Fixed service identifier attached to every syslog record.
pub const DEFAULT_TAG: &str = "dnstap";

/// Unix datagram sockets tried, in order, when connecting to syslog.
pub const DEFAULT_SYSLOG_SOCKETS: [&str; 3] = ["/dev/log", "/var/run/syslog", "/var/run/log"];

/// Syslog severity levels (RFC 5424 numbering).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

/// Syslog facilities supported by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facility {
    Kernel = 0,
    User = 1,
    Daemon = 3,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

/// Destination settings for the syslog transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyslogConfig {
    pub severity: Severity,
    pub facility: Facility,
    /// Tag written before the pid in each record.
    pub tag: String,
    /// Candidate socket paths; the first that accepts a connection wins.
    pub sockets: Vec<PathBuf>,
}

impl SyslogConfig {
    /// Encoded `PRI` value: `facility * 8 + severity`.
    pub fn priority(&self) -> u8 {
        (self.facility as u8) * 8 + self.severity as u8
    }
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Notice,
            facility: Facility::User,
            tag: DEFAULT_TAG.to_owned(),
            sockets: DEFAULT_SYSLOG_SOCKETS.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Configuration options for constructing a sink or supervisor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    /// Bounded queue size shared by the supervisor and its sinks.
    pub capacity: usize,
    pub syslog: SyslogConfig,
}

impl OutputConfig {
    /// Reject settings the outputs cannot operate with.
    pub fn validate(&self) -> Result<(), OutputError> {
        if self.capacity == 0 {
            return Err(OutputError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ));
        }
        if self.syslog.tag.trim().is_empty() {
            return Err(OutputError::InvalidConfig("tag must not be empty".into()));
        }
        if self.syslog.sockets.is_empty() {
            return Err(OutputError::InvalidConfig(
                "at least one syslog socket path is required".into(),
            ));
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            syslog: SyslogConfig::default(),
        }
    }
}
