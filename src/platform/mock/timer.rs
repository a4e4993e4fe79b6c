//! Mock Timer implementation for testing

use crate::platform::{traits::TimerInterface, Result};

/// Mock Timer implementation
///
/// Maintains a virtual clock: every delay advances simulated time instead of
/// sleeping, so deadline-driven code (URC accumulation, the send sequence)
/// runs to completion instantly in tests while still observing the same
/// timestamps it would on hardware.
#[derive(Debug)]
pub struct MockTimer {
    now_us: u64,
}

impl MockTimer {
    /// Create a new mock timer at t = 0
    pub fn new() -> Self {
        Self { now_us: 0 }
    }

    /// Advance the virtual clock without a delay call (for test setup)
    pub fn advance_ms(&mut self, ms: u64) {
        self.now_us = self.now_us.wrapping_add(ms * 1000);
    }
}

impl Default for MockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.now_us = self.now_us.wrapping_add(us as u64);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    fn now_us(&self) -> u64 {
        self.now_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_timer_delay_us() {
        let mut timer = MockTimer::new();
        assert_eq!(timer.now_us(), 0);

        timer.delay_us(1000).unwrap();
        assert_eq!(timer.now_us(), 1000);

        timer.delay_us(500).unwrap();
        assert_eq!(timer.now_us(), 1500);
    }

    #[test]
    fn test_mock_timer_delay_ms() {
        let mut timer = MockTimer::new();
        timer.delay_ms(1).unwrap();
        assert_eq!(timer.now_us(), 1000);

        timer.delay_ms(5).unwrap();
        assert_eq!(timer.now_us(), 6000);
    }

    #[test]
    fn test_mock_timer_now_ms() {
        let mut timer = MockTimer::new();
        timer.delay_us(3500).unwrap();
        assert_eq!(timer.now_ms(), 3);
    }

    #[test]
    fn test_mock_timer_advance() {
        let mut timer = MockTimer::new();
        timer.advance_ms(250);
        assert_eq!(timer.now_ms(), 250);
    }
}
