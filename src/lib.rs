#![cfg_attr(not(test), no_std)]

//! sms_locator - SMS-queryable GPS locator firmware core
//!
//! A GPS receiver and a SIM800-class cellular modem share a single receive
//! path; this library time-slices receive ownership between them, accumulates
//! the modem's unsolicited SMS notifications, and answers a "CHECK" command
//! with the current coordinates.

// The mock platform is built on std collections
#[cfg(any(test, feature = "mock"))]
extern crate std;

// Platform abstraction layer (traits, errors, mock implementations)
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Core infrastructure (logging)
pub mod core;

// Locator application: receive-path multiplexing, command handling, replies
pub mod locator;
