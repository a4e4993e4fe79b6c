//! Receive-path switch trait
//!
//! The GPS receiver and the cellular modem share one hardware receive path;
//! only the selected line delivers bytes, and anything arriving on the other
//! line while it is deselected is lost at the wire. This module defines the
//! interface through which that selection is made.

use crate::platform::Result;

/// Receive line selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxLine {
    /// GPS receiver line
    Gps,
    /// Cellular modem line
    Modem,
}

/// Receive-path switch interface
///
/// Platform implementations must provide this interface for selecting which
/// peripheral feeds the shared receiver.
///
/// # Safety Invariants
///
/// - Exactly one line is selected at any instant
/// - Selection takes effect before `listen` returns; bytes arriving on the
///   deselected line afterwards are dropped by the hardware, not buffered
/// - Only one owner per switch instance, no concurrent access
pub trait RxSwitchInterface {
    /// Select the line that feeds the shared receiver
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Switch` if the line cannot be selected.
    fn listen(&mut self, line: RxLine) -> Result<()>;

    /// Currently selected line
    fn active(&self) -> RxLine;
}
