//! Behaviour of the leaf `Sink` output against an in-memory transport.

use std::{thread, time::Duration};

use crossbeam_channel::TrySendError;
use rstest::rstest;
use syslog_tap::{
    CaptureEvent, Output, OutputError, Sink, WriterTransport, encode_event,
    test_util::identity_frame,
};

mod test_utils;
use test_utils::{Harness, harness, wait_until};

fn open_sink(harness: &Harness) -> Sink {
    Sink::open(
        harness.shared_formatter(),
        &harness.opener,
        harness.config.capacity,
    )
    .expect("sink should open")
}

#[rstest]
fn writes_frames_in_push_order(harness: Harness) {
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    let tx = sink.channel();
    for id in ["f1", "f2", "f3"] {
        tx.send(identity_frame(id)).expect("send");
    }
    sink.close().expect("close");

    assert_eq!(harness.opener.lines(), ["f1", "f2", "f3"]);
    assert_eq!(harness.opener.opens(), 1);
}

#[rstest]
fn close_returns_after_every_queued_frame_is_written(harness: Harness) {
    harness.opener.set_write_delay(Duration::from_millis(5));
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    let tx = sink.channel();
    for n in 0..6 {
        tx.send(identity_frame(&format!("f{n}"))).expect("send");
    }
    sink.close().expect("close");

    assert_eq!(harness.opener.lines().len(), 6);
}

#[rstest]
fn close_is_idempotent(harness: Harness) {
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    sink.close().expect("first close");
    sink.close().expect("second close");
    assert!(sink.channel().send(identity_frame("late")).is_err());
    assert!(harness.opener.lines().is_empty());
}

#[rstest]
fn decode_failure_stops_the_sink(harness: Harness) {
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    let tx = sink.channel();
    tx.send(identity_frame("f1")).expect("send");
    tx.send(vec![0xc1]).expect("send");
    let _ = tx.send(identity_frame("f2"));

    let err = sink.close().expect_err("bad frame must fail the sink");
    assert!(matches!(err, OutputError::Decode(_)), "got {err:?}");
    assert_eq!(harness.opener.lines(), ["f1"]);
}

#[rstest]
fn format_failure_stops_the_sink(harness: Harness) {
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    let tx = sink.channel();
    tx.send(identity_frame("f1")).expect("send");
    tx.send(encode_event(&CaptureEvent::default()).expect("encode"))
        .expect("send");

    let err = sink.close().expect_err("unformattable event must fail");
    assert!(matches!(err, OutputError::Format), "got {err:?}");
    assert_eq!(harness.formatter.seen(), ["f1"]);
    assert_eq!(harness.opener.lines(), ["f1"]);
}

#[rstest]
fn write_failure_stops_the_sink(harness: Harness) {
    harness.opener.fail_writes(true);
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    sink.channel().send(identity_frame("f1")).expect("send");

    let err = sink.close().expect_err("write must fail");
    assert!(matches!(err, OutputError::Write(_)), "got {err:?}");
    assert_eq!(err.exit_code(), 1);
    assert!(harness.opener.lines().is_empty());
}

#[rstest]
fn unavailable_destination_fails_open(harness: Harness) {
    harness.opener.fail_opens(true);
    let err = Sink::open(harness.shared_formatter(), &harness.opener, 4)
        .err()
        .expect("open must fail");
    assert!(err.is_transport_open());
    assert_eq!(harness.opener.opens(), 0);
}

#[rstest]
fn zero_capacity_is_rejected(harness: Harness) {
    let err = Sink::open(harness.shared_formatter(), &harness.opener, 0)
        .err()
        .expect("open must fail");
    assert!(matches!(err, OutputError::InvalidConfig(_)));
}

#[rstest]
fn with_transport_rejects_zero_capacity(harness: Harness) {
    let err = Sink::with_transport(
        harness.shared_formatter(),
        Box::new(WriterTransport::new(Vec::new())),
        0,
    )
    .err()
    .expect("zero capacity must be rejected");
    assert!(matches!(err, OutputError::InvalidConfig(_)));
}

#[rstest]
fn abandoned_sink_discards_queued_frames(#[with(8)] harness: Harness) {
    harness.opener.set_write_delay(Duration::from_millis(50));
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    let tx = sink.channel();
    for n in 0..6 {
        tx.send(identity_frame(&format!("f{n}"))).expect("send");
    }
    drop(tx);
    wait_until("first write", Duration::from_secs(5), || {
        !harness.opener.written().is_empty()
    });

    sink.abandon();
    let at_abandon = harness.opener.written().len();
    thread::sleep(Duration::from_millis(300));
    let later = harness.opener.written().len();

    assert!(later <= at_abandon + 1, "{at_abandon} then {later}");
    assert!(later < 6);
}

#[rstest]
fn run_blocks_until_the_producer_closes(harness: Harness) {
    let mut sink = open_sink(&harness);
    let tx = sink.channel();
    let producer = thread::spawn(move || {
        for id in ["a", "b", "c", "d", "e", "f"] {
            tx.send(identity_frame(id)).expect("send");
        }
        tx.close();
    });

    sink.run().expect("run");
    producer.join().expect("producer thread");
    assert_eq!(harness.opener.lines(), ["a", "b", "c", "d", "e", "f"]);
}

#[rstest]
fn a_loop_runs_only_once(harness: Harness) {
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    assert!(matches!(sink.start(), Err(OutputError::AlreadyStarted)));
    assert!(matches!(sink.run(), Err(OutputError::AlreadyStarted)));
    sink.close().expect("close");
    assert!(matches!(sink.run(), Err(OutputError::AlreadyStarted)));
}

#[rstest]
fn full_queue_applies_backpressure(#[with(2)] harness: Harness) {
    let mut sink = open_sink(&harness);
    let tx = sink.channel();
    tx.try_send(identity_frame("f1")).expect("room for f1");
    tx.try_send(identity_frame("f2")).expect("room for f2");
    assert!(matches!(
        tx.try_send(identity_frame("f3")),
        Err(TrySendError::Full(_))
    ));

    sink.start().expect("start");
    tx.send(identity_frame("f3")).expect("send once drained");
    sink.close().expect("close");
    assert_eq!(harness.opener.lines(), ["f1", "f2", "f3"]);
}

#[rstest]
fn dropping_a_running_sink_drains_it(harness: Harness) {
    let mut sink = open_sink(&harness);
    sink.start().expect("start");
    let tx = sink.channel();
    tx.send(identity_frame("f1")).expect("send");
    tx.send(identity_frame("f2")).expect("send");
    drop(sink);

    assert_eq!(harness.opener.lines(), ["f1", "f2"]);
}
