//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use sms_locator::platform::mock::MockUart;
//! use sms_locator::platform::traits::UartInterface;
//!
//! let mut uart = MockUart::new(Default::default());
//! uart.write(b"AT").unwrap();
//! assert_eq!(uart.tx_buffer(), b"AT");
//! ```

#![cfg(any(test, feature = "mock"))]

mod gpio;
mod rx_bus;
mod switch;
mod timer;
mod uart;

pub use gpio::MockGpio;
pub use rx_bus::{MockBusPort, MockBusSwitch, MockRxBus};
pub use switch::MockSwitch;
pub use timer::MockTimer;
pub use uart::MockUart;
