//! On-chip converter driver
//!
//! Wraps the MCU's successive-approximation converter. The converter has a
//! single sample-and-hold stage shared by all multiplexer channels, so only
//! one conversion may be in flight system-wide; the scheduler registers its
//! channels with `must_finish` for that reason.

use crate::core::fault::Fault;
use crate::platform::traits::{AdcChannel, AdcInterface};
use crate::require;

/// Weight of one least-significant bit in volts.
const VOLTS_PER_LSB: f64 = 4e-3;

/// On-chip converter driver
pub struct IntAdc<'a, A: AdcInterface> {
    hw: &'a A,
    started: bool,
}

impl<'a, A: AdcInterface> IntAdc<'a, A> {
    pub fn new(hw: &'a A) -> Self {
        Self { hw, started: false }
    }

    /// Select `channel`, discard any stale sample and trigger a conversion.
    pub fn start(&mut self, channel: AdcChannel) {
        require!(!self.started, Fault::ConversionInFlight);

        self.hw.select(channel);
        self.hw.clear_sample();
        // The multiplexer needs to settle before the sample-and-hold opens.
        self.hw.settle();
        self.hw.trigger();

        self.started = true;
    }

    /// Poll the conversion; `Some(volts)` once the converter's busy flag
    /// clears.
    pub fn poll(&mut self) -> Option<f64> {
        require!(self.started, Fault::NotStarted);

        if self.hw.busy() {
            return None;
        }

        self.started = false;
        Some(f64::from(self.hw.sample()) * VOLTS_PER_LSB)
    }
}
