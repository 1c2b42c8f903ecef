//! Edge-timing frequency counter
//!
//! Measures the open-collector output frequency of the unit under test by
//! timing the interval between two rising edges with an 8-bit free-running
//! counter. The driver is split in two:
//!
//! - [`FreqCounter`], the main-loop half: `start` arms the edge interrupt,
//!   `poll` observes completion and computes the frequency.
//! - [`FreqCapture`], the interrupt half: the host's edge and
//!   counter-overflow handlers call [`FreqCapture::on_edge`] and
//!   [`FreqCapture::on_overflow`].
//!
//! The halves communicate only through [`FreqShared`] atomics: the interrupt
//! half publishes the captured tick count with relaxed stores and then the
//! done flag with a release store; `poll` reads the flag with acquire, so a
//! true flag guarantees the tick count is visible. Signals slower than the
//! counter can bound (the overflow tally saturating) terminate the
//! measurement with zero ticks, which the reciprocal maps to 0 Hz.

use crate::core::fault::Fault;
use crate::platform::traits::CaptureInterface;
use crate::require;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Duration of one counter tick in seconds (16 MHz clock, prescaler 1).
const TICK_PERIOD_SECONDS: f64 = 62.5e-9;

/// Overflow tally at which a measurement is forcibly terminated.
const OVERFLOW_LIMIT: u32 = 0xFFFF;

/// State shared between the main-loop and interrupt halves.
///
/// Allocate it wherever both halves can borrow it for their lifetime — a
/// `static` in firmware, a stack slot in tests.
pub struct FreqShared {
    done: AtomicBool,
    overflows: AtomicU32,
    ticks: AtomicU32,
    overflow_terminated: AtomicBool,
}

impl FreqShared {
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(true),
            overflows: AtomicU32::new(0),
            ticks: AtomicU32::new(0),
            overflow_terminated: AtomicBool::new(false),
        }
    }
}

impl Default for FreqShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Main-loop half of the frequency counter.
pub struct FreqCounter<'a, H: CaptureInterface> {
    hw: &'a H,
    shared: &'a FreqShared,
    started: bool,
}

/// Interrupt half of the frequency counter.
pub struct FreqCapture<'a, H: CaptureInterface> {
    hw: &'a H,
    shared: &'a FreqShared,
}

impl<'a, H: CaptureInterface> FreqCounter<'a, H> {
    /// Create both halves over the capture hardware and the shared state.
    pub fn split(hw: &'a H, shared: &'a FreqShared) -> (Self, FreqCapture<'a, H>) {
        (
            Self {
                hw,
                shared,
                started: false,
            },
            FreqCapture { hw, shared },
        )
    }

    /// Arm the edge interrupt for a new measurement.
    pub fn start(&mut self) {
        require!(
            self.shared.done.load(Ordering::Acquire) && !self.started,
            Fault::ConversionInFlight
        );
        debug_assert!(!self.hw.counter_running());
        debug_assert!(!self.hw.edge_armed());

        // Counters must be clean before the first edge can fire.
        self.hw.counter_reset();
        self.shared.overflows.store(0, Ordering::Relaxed);
        self.shared.ticks.store(0, Ordering::Relaxed);
        self.shared.overflow_terminated.store(false, Ordering::Relaxed);
        self.shared.done.store(false, Ordering::Release);
        self.started = true;

        self.hw.edge_arm();
    }

    /// Poll the measurement; `Some(hertz)` once two edges were captured or
    /// the overflow bound terminated it.
    pub fn poll(&mut self) -> Option<f64> {
        require!(self.started, Fault::NotStarted);

        if !self.shared.done.load(Ordering::Acquire) {
            return None;
        }

        // Both interrupt sources disarmed themselves before publishing done.
        debug_assert!(!self.hw.edge_armed());
        debug_assert!(!self.hw.counter_running());

        if self.shared.overflow_terminated.load(Ordering::Relaxed) {
            crate::log_debug!("frequency measurement terminated by overflow");
        }

        let ticks = f64::from(self.shared.ticks.load(Ordering::Relaxed));
        let frequency = 1.0 / (ticks * TICK_PERIOD_SECONDS);

        self.started = false;

        // Zero ticks (overflow termination) divides to infinity.
        Some(if frequency.is_finite() { frequency } else { 0.0 })
    }
}

impl<H: CaptureInterface> FreqCapture<'_, H> {
    /// Rising-edge interrupt: the first edge starts the counter, the second
    /// stops it and publishes the captured interval.
    pub fn on_edge(&self) {
        debug_assert!(!self.shared.done.load(Ordering::Relaxed));

        if self.hw.counter_running() {
            self.hw.counter_stop();
            self.hw.edge_disarm();

            let ticks = u32::from(self.hw.counter_read())
                + self.shared.overflows.load(Ordering::Relaxed) * H::COUNTER_RANGE;
            self.shared.ticks.store(ticks, Ordering::Relaxed);
            self.shared.done.store(true, Ordering::Release);
        } else {
            debug_assert_eq!(self.hw.counter_read(), 0);
            debug_assert_eq!(self.shared.overflows.load(Ordering::Relaxed), 0);

            self.hw.counter_start();
        }
    }

    /// Counter-overflow interrupt: extend the 8-bit counter; at the bound,
    /// terminate the measurement before the tally itself can wrap.
    pub fn on_overflow(&self) {
        debug_assert!(!self.shared.done.load(Ordering::Relaxed));

        let overflows = self.shared.overflows.load(Ordering::Relaxed) + 1;
        self.shared.overflows.store(overflows, Ordering::Relaxed);

        if overflows == OVERFLOW_LIMIT {
            self.hw.edge_disarm();
            self.hw.counter_stop();
            self.hw.counter_reset();
            self.shared.overflows.store(0, Ordering::Relaxed);
            self.shared.ticks.store(0, Ordering::Relaxed);
            self.shared.overflow_terminated.store(true, Ordering::Relaxed);
            self.shared.done.store(true, Ordering::Release);
        }
    }
}
