//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the platform traits so the
//! drivers and the scheduler can be exercised on the host without hardware.
//!
//! # Feature Gate
//!
//! Available during test builds and when the `mock` feature is enabled.
//!
//! The mocks record every operation the code under test performs and let
//! tests pre-program the values the "hardware" produces (bus bytes, samples,
//! counter values). Interrupt-driven behavior is simulated by calling the
//! interrupt halves of the drivers directly from the test.

#![cfg(any(test, feature = "mock"))]

mod adc;
mod capture;
mod slice_timer;
mod twi;

pub use adc::MockAdc;
pub use capture::MockCapture;
pub use slice_timer::MockSliceTimer;
pub use twi::{MockTwi, TwiOp};
