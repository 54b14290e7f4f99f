//! Firmware subsystems
//!
//! Higher-level behavior built on the devices and core infrastructure:
//! the operator console and the distance-to-target monitor.

pub mod console;
pub mod locator;
