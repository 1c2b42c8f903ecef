//! Acquisition drivers
//!
//! Drivers built on the platform abstraction traits. Each wraps one piece of
//! measurement hardware behind the start/poll shape the scheduler consumes.
//!
//! ## Modules
//!
//! - `twi`: two-wire bus transaction engine
//! - `mcp342x`: external delta-sigma converter on the two-wire bus
//! - `int_adc`: on-chip converter
//! - `freq_counter`: edge-timing frequency measurement
//! - `slice_timer`: time-slice countdown for the scheduler

pub mod freq_counter;
pub mod int_adc;
pub mod mcp342x;
pub mod slice_timer;
pub mod twi;
