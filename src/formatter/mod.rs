//! Formatter implementations for decoded capture events.
//!
//! Provides the core [`EventFormatter`] trait alongside [`SharedFormatter`],
//! the cloneable trait object each sink receives. Rotation hands the same
//! `SharedFormatter` to every replacement sink so output stays identical
//! across reopen.

use std::{fmt, sync::Arc};

use crate::event::CaptureEvent;

mod json;
mod quiet;

pub use json::JsonFormatter;
pub use quiet::QuietFormatter;

/// Trait for rendering a decoded event into bytes.
///
/// Implementors must be thread-safe (`Send + Sync`) so one formatter can be
/// shared by successive sinks. Returning `None` reports failure, which a sink
/// treats as fatal.
pub trait EventFormatter: Send + Sync {
    /// Render `event`, or `None` when it cannot be formatted.
    fn format(&self, event: &CaptureEvent) -> Option<Vec<u8>>;
}

impl<F> EventFormatter for F
where
    F: Fn(&CaptureEvent) -> Option<Vec<u8>> + Send + Sync,
{
    fn format(&self, event: &CaptureEvent) -> Option<Vec<u8>> {
        self(event)
    }
}

/// Shared formatter trait object used across sinks.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn EventFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: EventFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Whether both handles wrap the same formatter instance.
    pub fn ptr_eq(&self, other: &SharedFormatter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Format an event using the wrapped formatter instance.
    pub fn format(&self, event: &CaptureEvent) -> Option<Vec<u8>> {
        self.inner.format(event)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn EventFormatter>)")
    }
}

/// Render an optional event timestamp as `HH:MM:SS.ffffff` (UTC).
pub(crate) fn clock_time(sec: Option<u64>, nsec: Option<u32>) -> Option<String> {
    let secs = i64::try_from(sec?).ok()?;
    let stamp = chrono::DateTime::from_timestamp(secs, nsec.unwrap_or(0))?;
    Some(stamp.format("%H:%M:%S%.6f").to_string())
}
