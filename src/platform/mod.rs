//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the MCU peripherals the
//! measurement core touches. All platform-specific code is isolated here; a
//! board support crate implements the traits for the real silicon, the mock
//! module implements them for host testing.

pub mod traits;

// Mock peripherals (host testing)
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use traits::{
    AdcChannel, AdcInterface, CaptureInterface, SliceTimerInterface, TwiControl, TwiInterface,
};
