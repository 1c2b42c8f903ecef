#![cfg_attr(not(test), no_std)]

//! t400-rig - measurement core for the T400 automated test bench
//!
//! This library provides platform abstraction, acquisition drivers and the
//! cooperative measurement scheduler for a test rig that measures the supply
//! current, sensor supply voltage, open-collector frequency and analog output
//! of a T400 unit under test. All acquisitions run as non-blocking state
//! machines multiplexed by a single control loop; interrupt handlers only
//! advance the time-slice countdown and the frequency capture.

// Platform abstraction layer (peripheral traits + mock peripherals)
pub mod platform;

// Acquisition drivers using platform abstraction
pub mod devices;

// Core systems (measurement scheduler, fault policy, logging)
pub mod core;

// The concrete measurement set of the T400 bench
pub mod rig;
