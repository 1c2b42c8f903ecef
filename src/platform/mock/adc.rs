//! Mock on-chip converter
//!
//! Tests program the sample value and how many `busy` polls a conversion
//! takes; the mock records channel selects, settles and triggers.

use crate::platform::traits::{AdcChannel, AdcInterface};
use core::cell::Cell;

/// Mock on-chip converter
pub struct MockAdc {
    selected: Cell<Option<AdcChannel>>,
    sample: Cell<u16>,
    busy_polls: Cell<u8>,
    busy_left: Cell<u8>,
    settles: Cell<u32>,
    triggers: Cell<u32>,
    clears: Cell<u32>,
}

impl MockAdc {
    /// Create a new mock converter; conversions complete on the first poll.
    pub fn new() -> Self {
        Self {
            selected: Cell::new(None),
            sample: Cell::new(0),
            busy_polls: Cell::new(0),
            busy_left: Cell::new(0),
            settles: Cell::new(0),
            triggers: Cell::new(0),
            clears: Cell::new(0),
        }
    }

    /// Set the sample the next completed conversion returns.
    pub fn set_sample(&self, sample: u16) {
        self.sample.set(sample);
    }

    /// Make each conversion report busy for `polls` polls before completing.
    pub fn set_busy_polls(&self, polls: u8) {
        self.busy_polls.set(polls);
    }

    /// Channel currently routed to the converter.
    pub fn selected(&self) -> Option<AdcChannel> {
        self.selected.get()
    }

    /// Number of settle delays performed.
    pub fn settles(&self) -> u32 {
        self.settles.get()
    }

    /// Number of conversions triggered.
    pub fn triggers(&self) -> u32 {
        self.triggers.get()
    }

    /// Number of stale-sample clears performed.
    pub fn clears(&self) -> u32 {
        self.clears.get()
    }
}

impl Default for MockAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcInterface for MockAdc {
    fn select(&self, channel: AdcChannel) {
        self.selected.set(Some(channel));
    }

    fn clear_sample(&self) {
        self.clears.set(self.clears.get() + 1);
    }

    fn settle(&self) {
        self.settles.set(self.settles.get() + 1);
    }

    fn trigger(&self) {
        self.triggers.set(self.triggers.get() + 1);
        self.busy_left.set(self.busy_polls.get());
    }

    fn busy(&self) -> bool {
        let left = self.busy_left.get();
        if left > 0 {
            self.busy_left.set(left - 1);
            true
        } else {
            false
        }
    }

    fn sample(&self) -> u16 {
        self.sample.get()
    }
}
