//! Inbound command interpretation
//!
//! A position request is any notification whose text contains `CHECK` in any
//! letter case. When the request arrived as an SMS, the sender's address is
//! taken from the notification header and becomes the reply recipient from
//! then on; implausible addresses are rejected and the previous recipient
//! kept, so a garbled header never strands replies.

use crate::devices::modem::protocol;
use heapless::String;

/// Request keyword, matched case-insensitively
const KEYWORD: &[u8] = b"CHECK";

/// Shortest address accepted as a reply recipient
const MIN_ADDRESS_LEN: usize = 10;

/// Capacity for an international phone number
const ADDRESS_CAPACITY: usize = 20;

/// Matches position requests and tracks the reply recipient
pub struct CommandInterpreter {
    recipient: String<ADDRESS_CAPACITY>,
}

impl CommandInterpreter {
    /// Create an interpreter replying to `default_recipient`
    pub fn new(default_recipient: &str) -> Self {
        let mut interpreter = Self {
            recipient: String::new(),
        };
        interpreter.update_recipient(default_recipient.as_bytes());
        if interpreter.recipient.is_empty() {
            // Unusable build-time override; fall back to the baked-in number
            let _ = interpreter
                .recipient
                .push_str(super::config::BUILT_IN_RECIPIENT);
        }
        interpreter
    }

    /// Scan a notification buffer for a position request
    ///
    /// Returns true when the keyword is present; the caller owes a reply.
    /// When the buffer carries a notification header, the quoted sender
    /// address becomes the new recipient.
    pub fn process(&mut self, buffer: &[u8]) -> bool {
        if !protocol::contains_ignore_ascii_case(buffer, KEYWORD) {
            return false;
        }
        if let Some(start) = protocol::find(buffer, protocol::URC_HEADER) {
            let header = &buffer[start + protocol::URC_HEADER.len()..];
            if let Some(address) = protocol::first_quoted(header) {
                self.update_recipient(address);
            }
        }
        true
    }

    /// Current reply address
    pub fn recipient(&self) -> &str {
        self.recipient.as_str()
    }

    fn update_recipient(&mut self, candidate: &[u8]) {
        if candidate.len() < MIN_ADDRESS_LEN {
            crate::log_warn!(
                "Command: sender address too short, keeping {}",
                self.recipient.as_str()
            );
            return;
        }
        let address = match core::str::from_utf8(candidate) {
            Ok(address) => address,
            Err(_) => {
                crate::log_warn!(
                    "Command: sender address not text, keeping {}",
                    self.recipient.as_str()
                );
                return;
            }
        };
        let mut replacement: String<ADDRESS_CAPACITY> = String::new();
        if replacement.push_str(address).is_err() {
            crate::log_warn!(
                "Command: sender address too long, keeping {}",
                self.recipient.as_str()
            );
            return;
        }
        crate::log_info!("Command: reply recipient is now {}", address);
        self.recipient = replacement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "+639541045141";

    fn notification(body: &str) -> std::vec::Vec<u8> {
        let mut buffer = std::vec::Vec::new();
        buffer.extend_from_slice(b"\r\n+CMT: \"+639171234567\",\"\",\"24/06/01,12:30:05+32\"\r\n");
        buffer.extend_from_slice(body.as_bytes());
        buffer.extend_from_slice(b"\r\n");
        buffer
    }

    #[test]
    fn test_keyword_matches_in_any_case() {
        for body in ["CHECK", "check", "ChEcK", "please CHECK now"] {
            let mut interpreter = CommandInterpreter::new(DEFAULT);
            assert!(interpreter.process(&notification(body)), "body: {body}");
        }
    }

    #[test]
    fn test_unrelated_text_is_ignored() {
        let mut interpreter = CommandInterpreter::new(DEFAULT);
        assert!(!interpreter.process(&notification("hello there")));
        assert_eq!(interpreter.recipient(), DEFAULT);
    }

    #[test]
    fn test_sender_address_becomes_recipient() {
        let mut interpreter = CommandInterpreter::new(DEFAULT);
        assert!(interpreter.process(&notification("CHECK")));
        assert_eq!(interpreter.recipient(), "+639171234567");
    }

    #[test]
    fn test_short_address_keeps_previous_recipient() {
        let mut interpreter = CommandInterpreter::new(DEFAULT);
        let buffer = b"\r\n+CMT: \"12345\",\"\",\"24/06/01,12:30:05+32\"\r\nCHECK\r\n";
        assert!(interpreter.process(buffer));
        assert_eq!(interpreter.recipient(), DEFAULT);
    }

    #[test]
    fn test_ten_byte_address_is_accepted() {
        let mut interpreter = CommandInterpreter::new(DEFAULT);
        let buffer = b"\r\n+CMT: \"0917123456\",\"\",\"24/06/01,12:30:05+32\"\r\nCHECK\r\n";
        assert!(interpreter.process(buffer));
        assert_eq!(interpreter.recipient(), "0917123456");
    }

    #[test]
    fn test_keyword_without_header_uses_current_recipient() {
        let mut interpreter = CommandInterpreter::new(DEFAULT);
        assert!(interpreter.process(b"CHECK"));
        assert_eq!(interpreter.recipient(), DEFAULT);
    }
}
