//! Operator console
//!
//! The console UART is the human-visible side of the locator: banners, raw
//! modem echo, and buffer dumps go out; single-line commands come in. The
//! only inbound command is `check`, which asks for a position reply without
//! involving the modem's receive side.

use crate::platform::{traits::UartInterface, Result};
use heapless::String;

/// Longest accepted console line; anything longer is discarded
const LINE_CAPACITY: usize = 32;

/// Commands an operator can type at the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    /// Request a position reply to the current recipient
    Check,
}

/// Line-oriented diagnostic console
pub struct Console<U: UartInterface> {
    uart: U,
    line: String<LINE_CAPACITY>,
    oversize: bool,
}

impl<U: UartInterface> Console<U> {
    /// Create a console over the given UART
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            line: String::new(),
            oversize: false,
        }
    }

    /// Direct UART access
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Write a CRLF-terminated line
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.uart.write(line.as_bytes())?;
        self.uart.write(b"\r\n")?;
        self.uart.flush()?;
        Ok(())
    }

    /// Write raw bytes (modem echo, buffer dumps)
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.uart.write(data)?;
        Ok(())
    }

    /// Collect pending console input, returning a completed command
    ///
    /// Bytes accumulate until a line terminator; the finished line is trimmed
    /// and compared case-insensitively. Lines past the capacity are discarded
    /// through their terminator rather than truncated into a false match.
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn poll_command(&mut self) -> Result<Option<ConsoleCommand>> {
        while self.uart.available() {
            let mut byte = [0u8; 1];
            if self.uart.read(&mut byte)? == 0 {
                break;
            }
            if byte[0] == b'\r' || byte[0] == b'\n' {
                if let Some(command) = self.take_line() {
                    return Ok(Some(command));
                }
            } else if self.line.push(byte[0] as char).is_err() {
                self.oversize = true;
            }
        }
        Ok(None)
    }

    fn take_line(&mut self) -> Option<ConsoleCommand> {
        let oversize = core::mem::replace(&mut self.oversize, false);
        let line = core::mem::take(&mut self.line);
        if oversize {
            crate::log_warn!("Console: discarded oversized line");
            return None;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("check") {
            crate::log_info!("Console: manual position check requested");
            return Some(ConsoleCommand::Check);
        }
        crate::log_debug!("Console: ignoring input");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockUart;
    use crate::platform::traits::UartConfig;

    fn console() -> Console<MockUart> {
        Console::new(MockUart::new(UartConfig::default()))
    }

    #[test]
    fn test_write_line_appends_crlf() {
        let mut console = console();
        console.write_line("READY").unwrap();
        assert_eq!(console.uart_mut().tx_buffer(), b"READY\r\n");
    }

    #[test]
    fn test_check_line_triggers() {
        let mut console = console();
        console.uart_mut().inject_rx_data(b"check\n");
        assert_eq!(console.poll_command().unwrap(), Some(ConsoleCommand::Check));
    }

    #[test]
    fn test_uppercase_and_crlf_accepted() {
        let mut console = console();
        console.uart_mut().inject_rx_data(b"CHECK\r\n");
        assert_eq!(console.poll_command().unwrap(), Some(ConsoleCommand::Check));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let mut console = console();
        console.uart_mut().inject_rx_data(b"  check  \n");
        assert_eq!(console.poll_command().unwrap(), Some(ConsoleCommand::Check));
    }

    #[test]
    fn test_other_lines_yield_nothing() {
        let mut console = console();
        console.uart_mut().inject_rx_data(b"status\n\ncheck please\n");
        assert_eq!(console.poll_command().unwrap(), None);
    }

    #[test]
    fn test_oversized_line_discarded_not_truncated() {
        let mut console = console();
        console.uart_mut().inject_rx_data(b"checkcheckcheckcheckcheckcheckcheck\n");
        assert_eq!(console.poll_command().unwrap(), None);

        // The parser recovers on the next line
        console.uart_mut().inject_rx_data(b"check\n");
        assert_eq!(console.poll_command().unwrap(), Some(ConsoleCommand::Check));
    }

    #[test]
    fn test_line_split_across_polls() {
        let mut console = console();
        console.uart_mut().inject_rx_data(b"che");
        assert_eq!(console.poll_command().unwrap(), None);
        console.uart_mut().inject_rx_data(b"ck\n");
        assert_eq!(console.poll_command().unwrap(), Some(ConsoleCommand::Check));
    }
}
