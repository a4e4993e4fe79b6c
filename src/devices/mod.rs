//! Device drivers
//!
//! This module contains device drivers that use platform abstraction traits,
//! keeping all hardware access behind trait seams.
//!
//! ## Modules
//!
//! - `gps`: GPS receiver driver (NMEA sentence decoding)
//! - `modem`: SIM800-class cellular modem driver (AT commands, SMS)

pub mod gps;
pub mod modem;
