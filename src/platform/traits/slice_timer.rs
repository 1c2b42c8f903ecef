//! Time-slice tick source interface
//!
//! A periodic hardware timer whose overflow interrupt paces the measurement
//! scheduler's time slices. The countdown logic lives in
//! [`crate::devices::slice_timer`]; this trait only exposes arming the tick
//! interrupt.

/// Time-slice tick source interface
///
/// # Safety Invariants
///
/// - While armed, the tick interrupt fires once per `TICK_MICROS`
/// - `disarm` must also clear any pending tick so no stale interrupt fires
///   after re-arming
/// - `arm`/`disarm` are called from both main-loop and interrupt context;
///   implementations must be safe for that (single store to an interrupt
///   mask register on real hardware)
pub trait SliceTimerInterface {
    /// Period of one hardware tick in microseconds.
    const TICK_MICROS: u32;

    /// Reset the tick counter to the start of a period.
    fn reset(&self);

    /// Start the periodic tick interrupt.
    fn arm(&self);

    /// Stop the periodic tick interrupt.
    fn disarm(&self);
}
