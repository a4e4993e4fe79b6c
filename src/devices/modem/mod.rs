//! SIM800-class modem driver
//!
//! The modem shares one physical receive path with the GPS receiver, so this
//! driver never owns the line; it is handed UART access and polled while the
//! receive switch points its way. Inbound traffic is accumulated into a
//! notification buffer and classified by the `protocol` tokenizer; outbound
//! messages run through the `send` state machine.
//!
//! All waiting goes through [`TimerInterface`], which keeps every settle and
//! deadline drivable by a virtual clock in tests.

pub mod protocol;
pub mod send;

pub use protocol::ModemEvent;
pub use send::{SendState, SendTimings};

use crate::platform::{
    traits::{TimerInterface, UartInterface},
    Result,
};
use heapless::Vec;
use send::SendSequence;

/// Notification buffer capacity; processing is forced well before this
const BUFFER_CAPACITY: usize = 512;

/// Capacity for a drained command response
const RESPONSE_CAPACITY: usize = 256;

/// Modem timing and buffering policy
#[derive(Debug, Clone, Copy)]
pub struct ModemConfig {
    /// Give up accumulating once the line has been idle this long
    pub urc_idle_timeout_ms: u32,
    /// After the notification header appears, wait this long for the body
    pub urc_body_settle_ms: u32,
    /// Force a processing pass once the buffer grows past this
    pub urc_process_threshold: usize,
    /// Send sequence settles
    pub send: SendTimings,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            urc_idle_timeout_ms: 3000,
            urc_body_settle_ms: 1000,
            urc_process_threshold: 300,
            send: SendTimings::default(),
        }
    }
}

/// Outcome of one notification poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UrcPoll {
    /// No byte was pending
    Quiet,
    /// A notification header arrived and the body settle has run
    Notification,
    /// The buffer passed the processing threshold (or filled up)
    Overflow,
    /// Bytes arrived but the line went idle before any header
    Timeout,
}

/// Driver for an AT-command modem on a shared receive path
pub struct ModemDriver<U: UartInterface> {
    uart: U,
    config: ModemConfig,
    buffer: Vec<u8, BUFFER_CAPACITY>,
}

impl<U: UartInterface> ModemDriver<U> {
    /// Create a driver with an empty notification buffer
    pub fn new(uart: U, config: ModemConfig) -> Self {
        Self {
            uart,
            config,
            buffer: Vec::new(),
        }
    }

    /// Direct UART access
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Write an AT command line, CRLF-terminated
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn send_command(&mut self, line: &str) -> Result<()> {
        self.uart.write(line.as_bytes())?;
        self.uart.write(b"\r\n")?;
        self.uart.flush()?;
        Ok(())
    }

    /// Accumulate pending modem traffic into the notification buffer
    ///
    /// Returns immediately with [`UrcPoll::Quiet`] when nothing is pending.
    /// Otherwise reads byte-at-a-time, echoing each byte to `echo`, until one
    /// of: the notification header is seen (body settle runs, then the
    /// remainder is drained), the buffer passes the processing threshold, or
    /// the line stays idle past the timeout. On timeout the partial buffer is
    /// retained and extended by the next poll.
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn poll_urc<T: TimerInterface, S: UartInterface>(
        &mut self,
        timer: &mut T,
        echo: &mut S,
    ) -> Result<UrcPoll> {
        if !self.uart.available() {
            return Ok(UrcPoll::Quiet);
        }

        let mut deadline_ms = timer.now_ms() + u64::from(self.config.urc_idle_timeout_ms);
        loop {
            while self.uart.available() {
                let mut byte = [0u8; 1];
                if self.uart.read(&mut byte)? == 0 {
                    break;
                }
                echo.write(&byte)?;
                if self.buffer.push(byte[0]).is_err() {
                    return Ok(UrcPoll::Overflow);
                }
                deadline_ms = timer.now_ms() + u64::from(self.config.urc_idle_timeout_ms);

                if self.buffer.len() > self.config.urc_process_threshold {
                    return Ok(UrcPoll::Overflow);
                }
                if protocol::find(&self.buffer, protocol::URC_HEADER).is_some() {
                    self.settle_and_drain(timer, echo)?;
                    return Ok(UrcPoll::Notification);
                }
            }

            if timer.now_ms() >= deadline_ms {
                crate::log_debug!("Modem: idle timeout, {} bytes held", self.buffer.len());
                return Ok(UrcPoll::Timeout);
            }
            timer.delay_ms(1)?;
        }
    }

    /// Wait out the body settle, then pull in whatever has arrived
    fn settle_and_drain<T: TimerInterface, S: UartInterface>(
        &mut self,
        timer: &mut T,
        echo: &mut S,
    ) -> Result<()> {
        timer.delay_ms(self.config.urc_body_settle_ms)?;
        while self.uart.available() {
            let mut byte = [0u8; 1];
            if self.uart.read(&mut byte)? == 0 {
                break;
            }
            echo.write(&byte)?;
            if self.buffer.push(byte[0]).is_err() {
                break;
            }
        }
        Ok(())
    }

    /// Settle, then drain a command response
    ///
    /// Serves command/response exchanges (network registration query at
    /// boot); unsolicited traffic goes through `poll_urc` instead.
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn read_response<T: TimerInterface>(
        &mut self,
        timer: &mut T,
        settle_ms: u32,
    ) -> Result<Vec<u8, RESPONSE_CAPACITY>> {
        timer.delay_ms(settle_ms)?;
        let mut response = Vec::new();
        while self.uart.available() {
            let mut byte = [0u8; 1];
            if self.uart.read(&mut byte)? == 0 {
                break;
            }
            if response.push(byte[0]).is_err() {
                break;
            }
        }
        Ok(response)
    }

    /// Send one SMS, blocking until the sequence completes
    ///
    /// Drives [`SendSequence`] with scheduled wakes: sleep to the next
    /// deadline, advance, repeat. Delivery is not verified; see the `send`
    /// module notes.
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn send_message<T: TimerInterface, S: UartInterface>(
        &mut self,
        timer: &mut T,
        echo: &mut S,
        address: &str,
        body: &str,
    ) -> Result<()> {
        crate::log_info!("Modem: sending message to {}", address);
        let mut sequence = SendSequence::new(self.config.send);
        sequence.begin(&mut self.uart, address, timer.now_ms())?;
        while sequence.state() != SendState::Done {
            let now = timer.now_ms();
            if now < sequence.deadline_ms() {
                timer.delay_ms((sequence.deadline_ms() - now) as u32)?;
            }
            sequence.advance(&mut self.uart, echo, body, timer.now_ms())?;
        }
        Ok(())
    }

    /// Accumulated notification bytes
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Discard the notification buffer after a processing pass
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockTimer, MockUart};
    use crate::platform::traits::UartConfig;

    const URC: &[u8] = b"\r\n+CMT: \"+639171234567\",\"\",\"24/06/01,12:30:05+32\"\r\nCHECK\r\n";

    fn driver() -> ModemDriver<MockUart> {
        ModemDriver::new(MockUart::new(UartConfig::default()), ModemConfig::default())
    }

    #[test]
    fn test_send_command_appends_crlf() {
        let mut modem = driver();
        modem.send_command("AT+CMGF=1").unwrap();
        assert_eq!(modem.uart_mut().tx_buffer(), b"AT+CMGF=1\r\n");
    }

    #[test]
    fn test_poll_quiet_without_traffic() {
        let mut modem = driver();
        let mut timer = MockTimer::new();
        let mut echo = MockUart::new(UartConfig::default());

        let outcome = modem.poll_urc(&mut timer, &mut echo).unwrap();

        assert_eq!(outcome, UrcPoll::Quiet);
        // Quiet polls must not burn loop time
        assert_eq!(timer.now_ms(), 0);
        assert!(modem.buffer().is_empty());
    }

    #[test]
    fn test_poll_notification_accumulates_and_echoes() {
        let mut modem = driver();
        let mut timer = MockTimer::new();
        let mut echo = MockUart::new(UartConfig::default());
        modem.uart_mut().inject_rx_data(URC);

        let outcome = modem.poll_urc(&mut timer, &mut echo).unwrap();

        assert_eq!(outcome, UrcPoll::Notification);
        assert_eq!(modem.buffer(), URC);
        assert_eq!(echo.tx_buffer(), URC);
        // Only the body settle elapses; the header is spotted while draining
        assert_eq!(timer.now_ms(), 1000);
    }

    #[test]
    fn test_poll_timeout_retains_partial_buffer() {
        let mut modem = driver();
        let mut timer = MockTimer::new();
        let mut echo = MockUart::new(UartConfig::default());
        modem.uart_mut().inject_rx_data(b"\r\nRING\r\n");

        let outcome = modem.poll_urc(&mut timer, &mut echo).unwrap();

        assert_eq!(outcome, UrcPoll::Timeout);
        assert_eq!(modem.buffer(), b"\r\nRING\r\n");
        assert_eq!(timer.now_ms(), 3000);

        // The next poll extends the held bytes instead of starting over
        modem.uart_mut().inject_rx_data(URC);
        let outcome = modem.poll_urc(&mut timer, &mut echo).unwrap();
        assert_eq!(outcome, UrcPoll::Notification);
        assert!(modem.buffer().len() > URC.len());
    }

    #[test]
    fn test_poll_overflow_past_threshold() {
        let mut modem = driver();
        let mut timer = MockTimer::new();
        let mut echo = MockUart::new(UartConfig::default());
        modem.uart_mut().inject_rx_data(&[b'A'; 400]);

        let outcome = modem.poll_urc(&mut timer, &mut echo).unwrap();

        assert_eq!(outcome, UrcPoll::Overflow);
        assert_eq!(modem.buffer().len(), 301);
    }

    #[test]
    fn test_read_response_settles_then_drains() {
        let mut modem = driver();
        let mut timer = MockTimer::new();
        modem
            .uart_mut()
            .inject_rx_data(b"AT+CREG?\r\n+CREG: 0,1\r\n\r\nOK\r\n");

        let response = modem.read_response(&mut timer, 1000).unwrap();

        assert_eq!(&response[..], b"AT+CREG?\r\n+CREG: 0,1\r\n\r\nOK\r\n");
        assert_eq!(timer.now_ms(), 1000);
    }

    #[test]
    fn test_send_message_runs_full_sequence() {
        let mut modem = driver();
        let mut timer = MockTimer::new();
        let mut echo = MockUart::new(UartConfig::default());

        modem
            .send_message(&mut timer, &mut echo, "+639991234567", "14.599512,120.984222")
            .unwrap();

        assert_eq!(
            modem.uart_mut().tx_buffer(),
            b"AT+CMGF=1\r\nAT+CMGS=\"+639991234567\"\r\n14.599512,120.984222\x1a"
        );
        // Prompt, body, and ack settles in sequence
        assert_eq!(timer.now_ms(), 6200);
    }
}
