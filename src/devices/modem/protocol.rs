//! Modem output landmarks
//!
//! SIM800-class modems frame nothing: solicited responses, echoes, and
//! unsolicited notifications share one byte stream. This module scans raw
//! buffer content for the landmarks the locator cares about and lifts them
//! into structured events, so the layers above never do their own string
//! picking.
//!
//! Landmarks:
//! - `+CMT:` header — an inbound SMS delivered inline (routing mode
//!   `AT+CNMI=2,2,0,0,0`), followed by a quoted originating address and, on
//!   the next line, the message body
//! - `OK` / `ERROR` — final result codes of a command exchange
//! - `+CREG: 0,1` / `+CREG: 0,5` — registered on the home / roaming network

/// Unsolicited-notification header for inline SMS delivery
pub const URC_HEADER: &[u8] = b"+CMT:";

/// Structured event scanned out of accumulated modem output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemEvent<'a> {
    /// An inbound SMS notification: quoted originating address (may be empty
    /// if the header was truncated) and the message body that followed it
    NotificationReceived { address: &'a [u8], body: &'a [u8] },
    /// Final `OK` result code
    Ack,
    /// Final `ERROR` result code (including `+CME ERROR` / `+CMS ERROR`)
    Error,
}

/// Scan buffered modem output for the most significant landmark
///
/// A notification header outranks result codes: a `+CMT:` delivery usually
/// trails the `OK` of whatever command preceded it in the same accumulation.
pub fn scan(buffer: &[u8]) -> Option<ModemEvent<'_>> {
    if let Some(at) = find(buffer, URC_HEADER) {
        let after = &buffer[at + URC_HEADER.len()..];
        let address = first_quoted(after).unwrap_or(&[]);
        let body = after
            .iter()
            .position(|&b| b == b'\n')
            .map(|nl| trim_line_ends(&after[nl + 1..]))
            .unwrap_or(&[]);
        return Some(ModemEvent::NotificationReceived { address, body });
    }
    if find(buffer, b"ERROR").is_some() {
        return Some(ModemEvent::Error);
    }
    if find(buffer, b"OK").is_some() {
        return Some(ModemEvent::Ack);
    }
    None
}

/// First position of `needle` within `haystack`
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// ASCII case-insensitive substring test
pub fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// Content of the first double-quoted field, without the quotes
pub fn first_quoted(buffer: &[u8]) -> Option<&[u8]> {
    let open = buffer.iter().position(|&b| b == b'"')?;
    let rest = &buffer[open + 1..];
    let close = rest.iter().position(|&b| b == b'"')?;
    Some(&rest[..close])
}

/// Registered on the home or roaming network, per a `AT+CREG?` response
pub fn registration_ok(response: &[u8]) -> bool {
    find(response, b"+CREG: 0,1").is_some() || find(response, b"+CREG: 0,5").is_some()
}

fn trim_line_ends(mut s: &[u8]) -> &[u8] {
    while let [rest @ .., last] = s {
        if *last == b'\r' || *last == b'\n' {
            s = rest;
        } else {
            break;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    const URC: &[u8] = b"\r\n+CMT: \"+639991234567\",\"\",\"24/08/23,10:15:02+32\"\r\nplease CHECK now\r\n";

    #[test]
    fn test_find_locates_header() {
        assert_eq!(find(URC, URC_HEADER), Some(2));
        assert_eq!(find(b"no header here", URC_HEADER), None);
        assert_eq!(find(b"", b"OK"), None);
    }

    #[test]
    fn test_contains_ignore_ascii_case() {
        assert!(contains_ignore_ascii_case(b"please ChEcK now", b"CHECK"));
        assert!(contains_ignore_ascii_case(b"CHECK", b"check"));
        assert!(!contains_ignore_ascii_case(b"chec", b"CHECK"));
        assert!(!contains_ignore_ascii_case(b"chess club", b"CHECK"));
    }

    #[test]
    fn test_first_quoted_extracts_address() {
        assert_eq!(
            first_quoted(b" \"+639991234567\",\"\",..."),
            Some(&b"+639991234567"[..])
        );
        assert_eq!(first_quoted(b"\"\""), Some(&b""[..]));
        assert_eq!(first_quoted(b"no quotes"), None);
        // Unterminated quote yields nothing rather than the buffer tail
        assert_eq!(first_quoted(b"\"+6399"), None);
    }

    #[test]
    fn test_scan_notification_with_address_and_body() {
        match scan(URC) {
            Some(ModemEvent::NotificationReceived { address, body }) => {
                assert_eq!(address, b"+639991234567");
                assert_eq!(body, b"please CHECK now");
            }
            other => panic!("expected notification, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_notification_without_body_line() {
        let truncated = b"+CMT: \"+639991234567\"";
        match scan(truncated) {
            Some(ModemEvent::NotificationReceived { address, body }) => {
                assert_eq!(address, b"+639991234567");
                assert_eq!(body, b"");
            }
            other => panic!("expected notification, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_result_codes() {
        assert_eq!(scan(b"\r\nOK\r\n"), Some(ModemEvent::Ack));
        assert_eq!(scan(b"\r\nERROR\r\n"), Some(ModemEvent::Error));
        assert_eq!(scan(b"+CMS ERROR: 500\r\n"), Some(ModemEvent::Error));
        assert_eq!(scan(b"\r\n+CMGS: 12\r\n\r\nOK\r\n"), Some(ModemEvent::Ack));
        assert_eq!(scan(b"nothing of note"), None);
    }

    #[test]
    fn test_scan_notification_outranks_result_codes() {
        let mixed = b"OK\r\n+CMT: \"+639991234567\"\r\ncheck\r\n";
        assert!(matches!(
            scan(mixed),
            Some(ModemEvent::NotificationReceived { .. })
        ));
    }

    #[test]
    fn test_registration_ok() {
        assert!(registration_ok(b"\r\n+CREG: 0,1\r\n\r\nOK\r\n"));
        assert!(registration_ok(b"+CREG: 0,5"));
        assert!(!registration_ok(b"+CREG: 0,2"));
        assert!(!registration_ok(b""));
    }
}
