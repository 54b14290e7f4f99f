//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod gpio;
pub mod uart;
pub mod watchdog;

// Re-export trait interfaces
pub use gpio::{GpioInterface, GpioMode};
pub use uart::{UartConfig, UartInterface};
pub use watchdog::WatchdogInterface;
