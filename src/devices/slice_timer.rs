//! Time-slice countdown
//!
//! One hardware timer paces the measurement scheduler: `start` converts the
//! requested slice duration into whole hardware ticks (≈16.32 ms each) and
//! arms the tick interrupt; the interrupt half counts the ticks down and
//! raises the expired flag on the last one, disarming the hardware itself so
//! nothing needs to quiesce it from the main loop.
//!
//! Like the frequency counter, the driver splits into a main-loop half
//! ([`SliceTimer`], which also implements the scheduler's [`SliceClock`])
//! and an interrupt half ([`SliceTick`]) sharing [`SliceShared`] atomics.

use crate::core::fault::Fault;
use crate::core::measure::SliceClock;
use crate::platform::traits::SliceTimerInterface;
use crate::require;
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use embassy_time::Duration;

/// State shared between the main-loop and interrupt halves.
pub struct SliceShared {
    remaining: AtomicU16,
    expired: AtomicBool,
}

impl SliceShared {
    /// A fresh countdown starts out expired, ready to be started.
    pub const fn new() -> Self {
        Self {
            remaining: AtomicU16::new(0),
            expired: AtomicBool::new(true),
        }
    }
}

impl Default for SliceShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Main-loop half of the time-slice countdown.
pub struct SliceTimer<'a, H: SliceTimerInterface> {
    hw: &'a H,
    shared: &'a SliceShared,
}

/// Interrupt half of the time-slice countdown.
pub struct SliceTick<'a, H: SliceTimerInterface> {
    hw: &'a H,
    shared: &'a SliceShared,
}

impl<'a, H: SliceTimerInterface> SliceTimer<'a, H> {
    /// Create both halves over the tick source and the shared state.
    pub fn split(hw: &'a H, shared: &'a SliceShared) -> (Self, SliceTick<'a, H>) {
        (Self { hw, shared }, SliceTick { hw, shared })
    }

    /// Arm a countdown of `duration`, quantized to whole hardware ticks.
    pub fn start(&mut self, duration: Duration) {
        // The previous countdown must have run out.
        require!(self.shared.expired.load(Ordering::Acquire), Fault::SliceBusy);

        let ticks = duration.as_micros() / u64::from(H::TICK_MICROS);
        require!(ticks > 0, Fault::SliceTooShort);
        require!(ticks <= u64::from(u16::MAX), Fault::SliceTooLong);

        self.hw.disarm();
        self.hw.reset();
        self.shared.remaining.store(ticks as u16, Ordering::Relaxed);
        self.shared.expired.store(false, Ordering::Release);
        self.hw.arm();
    }

    /// True once the countdown has run out.
    pub fn expired(&self) -> bool {
        self.shared.expired.load(Ordering::Acquire)
    }
}

impl<H: SliceTimerInterface> SliceClock for SliceTimer<'_, H> {
    fn start(&mut self, duration: Duration) {
        SliceTimer::start(self, duration);
    }

    fn expired(&self) -> bool {
        SliceTimer::expired(self)
    }
}

impl<H: SliceTimerInterface> SliceTick<'_, H> {
    /// Periodic tick interrupt: count down; on the final tick stop the
    /// hardware and raise the expired flag.
    pub fn on_tick(&self) {
        debug_assert!(!self.shared.expired.load(Ordering::Relaxed));

        let remaining = self
            .shared
            .remaining
            .load(Ordering::Relaxed)
            .saturating_sub(1);
        self.shared.remaining.store(remaining, Ordering::Relaxed);

        if remaining == 0 {
            self.hw.disarm();
            self.shared.expired.store(true, Ordering::Release);
        }
    }
}
