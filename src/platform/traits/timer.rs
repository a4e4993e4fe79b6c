//! Timer interface trait
//!
//! This module defines the timer and delay interface that platform implementations must provide.
//!
//! Every fixed settle and deadline in the locator goes through this trait, so
//! host tests can substitute a virtual clock and run without real elapsed time.

use crate::platform::Result;

/// Timer interface trait
///
/// Platform implementations must provide this interface for timing and delays.
///
/// # Safety Invariants
///
/// - Timer peripheral must be initialized before use
/// - Monotonic time source (never goes backwards)
pub trait TimerInterface {
    /// Delay for specified number of microseconds
    ///
    /// Blocks execution for at least `us` microseconds.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Delay for specified number of milliseconds
    ///
    /// Blocks execution for at least `ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_ms(&mut self, ms: u32) -> Result<()>;

    /// Get current time in microseconds
    ///
    /// Returns a monotonic timestamp in microseconds since platform
    /// initialization. Applications must handle wraparound when calculating
    /// durations over very long uptimes.
    fn now_us(&self) -> u64;

    /// Get current time in milliseconds
    ///
    /// Returns a monotonic timestamp in milliseconds since platform initialization.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
