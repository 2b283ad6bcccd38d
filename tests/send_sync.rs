//! Thread-safety guarantees for the public types.

use rstest::rstest;
use static_assertions::{assert_impl_all, assert_not_impl_any};
use syslog_tap::{
    FrameReceiver, FrameSender, JsonFormatter, OutputConfig, QuietFormatter, SelectedOutput,
    SharedFormatter, SignalSources, SignalTriggers, Sink, Supervisor, SyslogOpener,
};

#[rstest]
fn outputs_move_between_threads() {
    assert_impl_all!(Sink: Send);
    assert_impl_all!(Supervisor: Send);
    assert_impl_all!(SelectedOutput: Send);
    assert_not_impl_any!(Sink: Sync);
    assert_not_impl_any!(Supervisor: Sync);
}

#[rstest]
fn shared_handles_are_send_sync() {
    assert_impl_all!(FrameSender: Send, Sync, Clone);
    assert_impl_all!(SharedFormatter: Send, Sync, Clone);
    assert_impl_all!(SignalTriggers: Send, Sync, Clone);
    assert_impl_all!(QuietFormatter: Send, Sync);
    assert_impl_all!(JsonFormatter: Send, Sync);
    assert_impl_all!(SyslogOpener: Send, Sync);
    assert_impl_all!(OutputConfig: Send, Sync, Clone);
}

#[rstest]
fn consumer_sides_are_send() {
    assert_impl_all!(FrameReceiver: Send);
    assert_impl_all!(SignalSources: Send);
}
