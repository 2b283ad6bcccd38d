//! Fixtures pairing an in-memory transport opener with a recording
//! formatter so outputs can be exercised without a syslog daemon.

use rstest::fixture;
use syslog_tap::{
    OutputConfig, SharedFormatter,
    test_util::{IdentityFormatter, MemoryOpener},
};

pub struct Harness {
    pub opener: MemoryOpener,
    pub formatter: IdentityFormatter,
    pub config: OutputConfig,
}

impl Harness {
    pub fn shared_formatter(&self) -> SharedFormatter {
        self.formatter.shared()
    }
}

/// Fresh opener and formatter with a small queue capacity.
#[fixture]
pub fn harness(#[default(4)] capacity: usize) -> Harness {
    Harness {
        opener: MemoryOpener::new(),
        formatter: IdentityFormatter::new(),
        config: OutputConfig {
            capacity,
            ..OutputConfig::default()
        },
    }
}
