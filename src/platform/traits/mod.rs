//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod gpio;
pub mod rx_switch;
pub mod timer;
pub mod uart;

// Re-export trait interfaces
pub use gpio::{GpioInterface, GpioMode};
pub use rx_switch::{RxLine, RxSwitchInterface};
pub use timer::TimerInterface;
pub use uart::{UartConfig, UartInterface, UartParity, UartStopBits};
