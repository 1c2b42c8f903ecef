//! Mock edge-capture hardware
//!
//! Tests set the free-running counter value directly and simulate edges and
//! overflows by calling the frequency counter's interrupt half.

use crate::platform::traits::CaptureInterface;
use core::cell::Cell;

/// Mock edge-capture hardware
pub struct MockCapture {
    running: Cell<bool>,
    armed: Cell<bool>,
    count: Cell<u8>,
}

impl MockCapture {
    /// Create mock capture hardware: counter stopped, edge interrupt off.
    pub fn new() -> Self {
        Self {
            running: Cell::new(false),
            armed: Cell::new(false),
            count: Cell::new(0),
        }
    }

    /// Set the free-running counter value the next read reports.
    pub fn set_count(&self, count: u8) {
        self.count.set(count);
    }
}

impl Default for MockCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureInterface for MockCapture {
    fn counter_start(&self) {
        self.running.set(true);
    }

    fn counter_stop(&self) {
        self.running.set(false);
    }

    fn counter_reset(&self) {
        self.count.set(0);
    }

    fn counter_read(&self) -> u8 {
        self.count.get()
    }

    fn counter_running(&self) -> bool {
        self.running.get()
    }

    fn edge_arm(&self) {
        self.armed.set(true);
    }

    fn edge_disarm(&self) {
        self.armed.set(false);
    }

    fn edge_armed(&self) -> bool {
        self.armed.get()
    }
}
