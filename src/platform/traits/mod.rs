//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.
//! All methods take `&self`: implementations stand in for memory-mapped
//! register blocks, which are inherently shared between the main loop and
//! interrupt handlers. Mock implementations use interior mutability instead.

pub mod adc;
pub mod capture;
pub mod slice_timer;
pub mod twi;

// Re-export trait interfaces
pub use adc::{AdcChannel, AdcInterface};
pub use capture::CaptureInterface;
pub use slice_timer::SliceTimerInterface;
pub use twi::{status, TwiControl, TwiInterface};
