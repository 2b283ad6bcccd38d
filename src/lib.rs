//! Syslog output for a structured event-capture pipeline.
//!
//! Producers push serialised frames into an [`Output`]. A [`Sink`] decodes,
//! formats and writes each frame to a [`LogTransport`]; a [`Supervisor`]
//! fronts a sink, reopening it on a rotate signal and stopping at once on a
//! terminate signal.
//!
//! ```text
//! producer -> Supervisor queue -> control loop -> Sink queue -> Sink loop -> syslog
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod formatter;
pub mod frame;
pub mod output;
pub mod queue;
pub mod signals;
pub mod sink;
pub mod supervisor;
pub mod transport;
mod worker;

#[cfg(feature = "test-util")]
pub mod test_util;

pub use config::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_TAG, Facility, OutputConfig, Severity, SyslogConfig,
};
pub use error::OutputError;
pub use event::{CaptureEvent, Message, MessageType, SocketFamily, SocketProtocol};
pub use formatter::{EventFormatter, JsonFormatter, QuietFormatter, SharedFormatter};
pub use frame::{Frame, MAX_FRAME_SIZE, decode_frame, encode_event, read_frame, write_frame};
pub use output::{Output, SelectedOutput};
pub use queue::{FrameReceiver, FrameSender, frame_queue};
pub use signals::{OsSignals, SignalSources, SignalTriggers};
pub use sink::Sink;
pub use supervisor::{ControlEvent, Supervisor, SupervisorState};
pub use transport::{LogTransport, SyslogOpener, SyslogTransport, TransportOpener, WriterTransport};
