//! Core measurement infrastructure
//!
//! This module contains the hardware-independent parts of the rig firmware:
//! the measurement scheduler, the fatal-fault policy and the logging macros.

pub mod fault;
pub mod logging;
pub mod measure;
