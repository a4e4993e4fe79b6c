//! GPS receiver driver (NMEA protocol)
//!
//! Feeds raw receiver bytes through an NMEA sentence decoder and keeps the
//! most recent valid reading. The driver is generic over any type implementing
//! `UartInterface` and is only given receive focus during a GPS ownership
//! window; everything else about receiver sharing lives in the locator layer.
//!
//! Sentence merge:
//! - **GGA**: position, altitude, satellite count (latches fix validity)
//! - **RMC**/**VTG**: ground speed

use crate::platform::{traits::UartInterface, Result};
use nmea0183::{ParseResult, Parser};

/// Ground-speed conversion, knots to km/h
const KNOTS_TO_KMH: f32 = 1.852;

/// Last known GPS reading
///
/// `valid` latches true on the first positioned GGA sentence and is never
/// cleared afterwards: malformed or fixless input leaves every field
/// untouched, so the struct always holds the most recent valid reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fix {
    /// A positioned sentence has been decoded since boot
    pub valid: bool,
    /// Latitude in degrees (-90 to +90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to +180)
    pub longitude: f64,
    /// Ground speed in km/h
    pub speed_kmh: f32,
    /// Altitude in meters above sea level
    pub altitude_m: f32,
    /// Number of satellites used in the fix
    pub satellites: u8,
}

/// GPS receiver driver
///
/// Latitude and longitude are kept as `f64`: reply bodies carry six
/// fractional digits, which single precision cannot represent.
pub struct GpsReceiver<U: UartInterface> {
    uart: U,
    parser: Parser,
    fix: Fix,
}

impl<U: UartInterface> GpsReceiver<U> {
    /// Create a new GPS receiver driver
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            parser: Parser::new(),
            fix: Fix::default(),
        }
    }

    /// Get mutable reference to the underlying UART
    ///
    /// Used by tests to inject sentence data.
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Drain available receiver bytes through the sentence decoder
    ///
    /// Call only while the GPS line owns the shared receiver. Consumes
    /// everything currently readable and returns the number of bytes fed to
    /// the decoder. Malformed sentences are absorbed by the decoder without
    /// any effect on the current fix.
    ///
    /// # Errors
    ///
    /// Returns an error if UART communication fails.
    pub fn pump(&mut self) -> Result<usize> {
        let mut consumed = 0;
        let mut chunk = [0u8; 64];

        loop {
            let read_count = self.uart.read(&mut chunk)?;
            if read_count == 0 {
                return Ok(consumed);
            }
            consumed += read_count;

            for &byte in chunk.iter().take(read_count) {
                if let Some(result) = self.parser.parse_from_byte(byte) {
                    match result {
                        Ok(ParseResult::GGA(Some(gga))) => self.apply_gga(&gga),
                        Ok(ParseResult::RMC(Some(rmc))) => self.apply_rmc(&rmc),
                        Ok(ParseResult::VTG(Some(vtg))) => self.apply_vtg(&vtg),
                        // Fixless sentences, other types, or parse errors
                        // leave the previous reading in place
                        _ => {}
                    }
                }
            }
        }
    }

    /// Current fix (most recent valid reading, or the all-zero invalid default)
    pub fn fix(&self) -> Fix {
        self.fix
    }

    fn apply_gga(&mut self, gga: &nmea0183::GGA) {
        self.fix.latitude = gga.latitude.as_f64();
        self.fix.longitude = gga.longitude.as_f64();
        self.fix.satellites = gga.sat_in_use;
        if let Some(altitude) = &gga.altitude {
            self.fix.altitude_m = altitude.meters;
        }
        if !self.fix.valid {
            crate::log_info!("GPS: fix acquired ({} satellites)", gga.sat_in_use);
        }
        self.fix.valid = true;
    }

    fn apply_rmc(&mut self, rmc: &nmea0183::RMC) {
        self.fix.speed_kmh = rmc.speed.as_knots() * KNOTS_TO_KMH;
    }

    fn apply_vtg(&mut self, vtg: &nmea0183::VTG) {
        self.fix.speed_kmh = vtg.speed.as_knots() * KNOTS_TO_KMH;
    }
}
