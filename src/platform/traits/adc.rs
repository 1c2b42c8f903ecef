//! On-chip analog-to-digital converter interface
//!
//! The MCU's converter has a single sample-and-hold stage behind an input
//! multiplexer: one conversion can be in flight at a time, system-wide.

/// Input multiplexer channels of the on-chip converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    Ch0 = 0b000,
    Ch1 = 0b001,
    Ch2 = 0b010,
    Ch3 = 0b011,
    Ch4 = 0b100,
    Ch5 = 0b101,
    Ch6 = 0b110,
    Ch7 = 0b111,
}

/// On-chip converter interface
///
/// # Safety Invariants
///
/// - The converter must be enabled before use
/// - `select` must not be called while `busy` is true
/// - `settle` blocks for the multiplexer settling time (~1 ms); it is the
///   only fixed delay the measurement core performs
pub trait AdcInterface {
    /// Route the given channel to the converter input.
    fn select(&self, channel: AdcChannel);

    /// Discard any stale sample left in the result register.
    fn clear_sample(&self);

    /// Let the multiplexer input settle before triggering.
    fn settle(&self);

    /// Trigger a conversion.
    fn trigger(&self);

    /// True while a conversion is in progress.
    fn busy(&self) -> bool;

    /// Sample from the last completed conversion.
    fn sample(&self) -> u16;
}
