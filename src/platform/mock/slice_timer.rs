//! Mock time-slice tick source
//!
//! Ticks are simulated by calling the slice timer's interrupt half; the mock
//! only records arming.

use crate::platform::traits::SliceTimerInterface;
use core::cell::Cell;

/// Mock time-slice tick source with the reference platform's 16.32 ms tick.
pub struct MockSliceTimer {
    armed: Cell<bool>,
    resets: Cell<u32>,
}

impl MockSliceTimer {
    /// Create a disarmed mock tick source.
    pub fn new() -> Self {
        Self {
            armed: Cell::new(false),
            resets: Cell::new(0),
        }
    }

    /// True while the tick interrupt is armed.
    pub fn armed(&self) -> bool {
        self.armed.get()
    }

    /// Number of counter resets performed.
    pub fn resets(&self) -> u32 {
        self.resets.get()
    }
}

impl Default for MockSliceTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceTimerInterface for MockSliceTimer {
    const TICK_MICROS: u32 = 16_320;

    fn reset(&self) {
        self.resets.set(self.resets.get() + 1);
    }

    fn arm(&self) {
        self.armed.set(true);
    }

    fn disarm(&self) {
        self.armed.set(false);
    }
}
