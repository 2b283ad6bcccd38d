#![allow(dead_code)]

pub mod fixtures;

use std::{
    thread,
    time::{Duration, Instant},
};

pub use fixtures::{Harness, harness};

/// Poll `condition` until it holds, panicking after `timeout`.
pub fn wait_until(what: &str, timeout: Duration, mut condition: impl FnMut() -> bool) {
    let started = Instant::now();
    while !condition() {
        if started.elapsed() > timeout {
            panic!("timed out waiting for {what}");
        }
        thread::sleep(Duration::from_millis(1));
    }
}
