//! Mock UART implementation for testing

use crate::platform::{
    traits::{UartConfig, UartInterface},
    Result,
};
use core::cell::RefCell;
use std::vec::Vec;

/// Mock UART implementation
///
/// Provides in-memory buffers for transmit and receive data,
/// allowing unit tests to verify UART operations without hardware.
///
/// # Example
///
/// ```
/// use sms_locator::platform::mock::MockUart;
/// use sms_locator::platform::traits::UartInterface;
///
/// let mut uart = MockUart::new(Default::default());
///
/// // Write data
/// uart.write(b"AT+CMGF=1").unwrap();
///
/// // Verify transmitted data
/// assert_eq!(uart.tx_buffer(), b"AT+CMGF=1");
///
/// // Inject received data for testing
/// uart.inject_rx_data(b"OK");
/// let mut buf = [0u8; 2];
/// uart.read(&mut buf).unwrap();
/// assert_eq!(&buf, b"OK");
/// ```
#[derive(Debug)]
pub struct MockUart {
    config: UartConfig,
    tx_buffer: RefCell<Vec<u8>>,
    rx_buffer: RefCell<Vec<u8>>,
}

impl MockUart {
    /// Create a new mock UART
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            tx_buffer: RefCell::new(Vec::new()),
            rx_buffer: RefCell::new(Vec::new()),
        }
    }

    /// Get transmitted data (for test verification)
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx_buffer.borrow().clone()
    }

    /// Clear transmit buffer
    pub fn clear_tx_buffer(&mut self) {
        self.tx_buffer.borrow_mut().clear();
    }

    /// Inject receive data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.borrow_mut().extend_from_slice(data);
    }

    /// Get configured baud rate
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl UartInterface for MockUart {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.tx_buffer.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut rx = self.rx_buffer.borrow_mut();
        let to_read = core::cmp::min(buffer.len(), rx.len());

        buffer[..to_read].copy_from_slice(&rx[..to_read]);
        rx.drain(..to_read);

        Ok(to_read)
    }

    fn available(&self) -> bool {
        !self.rx_buffer.borrow().is_empty()
    }

    fn flush(&mut self) -> Result<()> {
        // Mock implementation - nothing to flush
        Ok(())
    }
}
