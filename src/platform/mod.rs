//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the peripherals the
//! locator firmware touches: the console UART, the indicator LED and
//! the hardware watchdog. All platform-specific code is isolated here.

pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{GpioInterface, UartInterface, WatchdogInterface};
