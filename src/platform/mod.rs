//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the locator's peripherals:
//! three UARTs (GPS, modem, console), the shared receive-path switch, a
//! millisecond timer, and the status LED. All platform-specific code must be
//! isolated behind these traits; this repo ships the traits and a mock
//! implementation, hardware ports live in board support trees.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{GpioInterface, RxSwitchInterface, TimerInterface, UartInterface};
