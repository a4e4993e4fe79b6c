//! SMS send sequence
//!
//! Submitting a message is a scripted exchange: select text mode, open a
//! compose prompt for the recipient, stream the body, close with the 0x1A
//! terminator, then let the network's acknowledgment drain past. Each step
//! needs a settle before the next, so the exchange is expressed as a small
//! deadline-driven state machine; the caller sleeps until `deadline_ms` and
//! then calls [`SendSequence::advance`], which lets a virtual clock drive the
//! whole sequence in tests.
//!
//! Delivery is not verified. A final `ERROR` is recognized and logged, but
//! the sequence still completes: there is no status channel to report into
//! and no retry policy, so the operator-facing console echo is the only
//! witness. Known limitation.

use crate::devices::modem::protocol::{self, ModemEvent};
use crate::platform::{traits::UartInterface, Result};
use core::fmt::Write as _;
use heapless::{String, Vec};

/// Message terminator (Ctrl-Z), submits the composed message
const TERMINATOR: u8 = 26;

/// Capacity for the compose command line, `AT+CMGS="<addr>"`
const COMPOSE_LINE_CAPACITY: usize = 48;

/// Settle times between send-sequence steps
#[derive(Debug, Clone, Copy)]
pub struct SendTimings {
    /// After the compose command, before the body may follow
    pub prompt_settle_ms: u32,
    /// After the body, before the terminator
    pub body_settle_ms: u32,
    /// After the terminator, for the acknowledgment to drain
    pub ack_settle_ms: u32,
}

impl Default for SendTimings {
    fn default() -> Self {
        Self {
            prompt_settle_ms: 1000,
            body_settle_ms: 200,
            ack_settle_ms: 5000,
        }
    }
}

/// Send sequence states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendState {
    /// Nothing in flight
    Idle,
    /// Compose command issued, waiting out the prompt settle
    AwaitingEcho,
    /// Body streamed, waiting before the terminator
    Sending,
    /// Terminator sent, waiting for the acknowledgment to drain
    AwaitingAck,
    /// Sequence complete
    Done,
}

/// Deadline-driven SMS send state machine
///
/// `begin` issues the mode and compose commands; each later step is taken by
/// `advance` once the current deadline has passed. The machine never blocks
/// on its own: all waiting is the caller's, against `deadline_ms`.
pub struct SendSequence {
    timings: SendTimings,
    state: SendState,
    deadline_ms: u64,
}

impl SendSequence {
    /// Create an idle sequence
    pub fn new(timings: SendTimings) -> Self {
        Self {
            timings,
            state: SendState::Idle,
            deadline_ms: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> SendState {
        self.state
    }

    /// Earliest time the next `advance` should run, ms
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Issue text-mode and compose commands, arming the prompt settle
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn begin<U: UartInterface>(
        &mut self,
        uart: &mut U,
        address: &str,
        now_ms: u64,
    ) -> Result<()> {
        let mut compose: String<COMPOSE_LINE_CAPACITY> = String::new();
        let _ = write!(compose, "AT+CMGS=\"{}\"", address);

        uart.write(b"AT+CMGF=1\r\n")?;
        uart.write(compose.as_bytes())?;
        uart.write(b"\r\n")?;
        uart.flush()?;

        self.state = SendState::AwaitingEcho;
        self.deadline_ms = now_ms + u64::from(self.timings.prompt_settle_ms);
        Ok(())
    }

    /// Take the step the current state calls for
    ///
    /// Call once the deadline has passed. `sink` receives the raw
    /// acknowledgment echo during the final drain.
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn advance<U: UartInterface, S: UartInterface>(
        &mut self,
        uart: &mut U,
        sink: &mut S,
        body: &str,
        now_ms: u64,
    ) -> Result<()> {
        match self.state {
            SendState::AwaitingEcho => {
                uart.write(body.as_bytes())?;
                uart.flush()?;
                self.state = SendState::Sending;
                self.deadline_ms = now_ms + u64::from(self.timings.body_settle_ms);
            }
            SendState::Sending => {
                uart.write(&[TERMINATOR])?;
                uart.flush()?;
                self.state = SendState::AwaitingAck;
                self.deadline_ms = now_ms + u64::from(self.timings.ack_settle_ms);
            }
            SendState::AwaitingAck => {
                let mut ack: Vec<u8, 128> = Vec::new();
                while uart.available() {
                    let mut byte = [0u8; 1];
                    if uart.read(&mut byte)? == 0 {
                        break;
                    }
                    sink.write(&byte)?;
                    let _ = ack.push(byte[0]);
                }
                match protocol::scan(&ack) {
                    Some(ModemEvent::Error) => {
                        crate::log_warn!("Modem: send returned ERROR, not retried")
                    }
                    Some(ModemEvent::Ack) => crate::log_debug!("Modem: send acknowledged"),
                    _ => crate::log_debug!("Modem: no acknowledgment drained"),
                }
                self.state = SendState::Done;
            }
            SendState::Idle | SendState::Done => {}
        }
        Ok(())
    }
}
