//! Position reply composition

use crate::devices::gps::Fix;
use core::fmt::Write as _;
use heapless::String;

/// Capacity for a composed reply
pub const REPLY_CAPACITY: usize = 64;

/// Render the reply text for the current fix
///
/// A valid fix becomes `lat,lng` in decimal degrees with six fractional
/// digits, pasteable into a maps search box. Without a fix the reply reports
/// the satellite count so the operator can judge how close a fix is.
pub fn compose(fix: &Fix) -> String<REPLY_CAPACITY> {
    let mut text = String::new();
    if fix.valid {
        let _ = write!(text, "{:.6},{:.6}", fix.latitude, fix.longitude);
    } else {
        let _ = write!(text, "No GPS fix. Sats: {}", fix.satellites);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_fix_renders_six_fractional_digits() {
        let fix = Fix {
            valid: true,
            latitude: 14.599512,
            longitude: 120.984222,
            ..Fix::default()
        };
        assert_eq!(compose(&fix).as_str(), "14.599512,120.984222");
    }

    #[test]
    fn test_southern_western_coordinates_keep_their_sign() {
        let fix = Fix {
            valid: true,
            latitude: -33.8688,
            longitude: -70.6693,
            ..Fix::default()
        };
        assert_eq!(compose(&fix).as_str(), "-33.868800,-70.669300");
    }

    #[test]
    fn test_missing_fix_reports_satellite_count() {
        let fix = Fix {
            satellites: 3,
            ..Fix::default()
        };
        assert_eq!(compose(&fix).as_str(), "No GPS fix. Sats: 3");
    }
}
