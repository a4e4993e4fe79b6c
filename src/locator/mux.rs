//! Receive-path time sharing
//!
//! One receiver serves two talkers, so listening time is rationed: short GPS
//! windows cut into long stretches of modem ownership. Whichever line is not
//! selected loses its bytes at the wire; the schedule here keeps windows
//! sparse enough that an SMS notification burst is unlikely to straddle one.
//!
//! The multiplexer holds the ownership token and the window bookkeeping; the
//! physical selection is delegated to an [`RxSwitchInterface`].

use crate::platform::{
    traits::{RxLine, RxSwitchInterface},
    Result,
};

/// Scheduler for GPS listening windows on the shared receive path
#[derive(Debug)]
pub struct RxMultiplexer {
    window_ms: u32,
    interval_ms: u32,
    owner: RxLine,
    window_opened_ms: u64,
    window_closed_ms: u64,
}

impl RxMultiplexer {
    /// Create a scheduler; the modem owns the line until the first window
    pub fn new(window_ms: u32, interval_ms: u32) -> Self {
        Self {
            window_ms,
            interval_ms,
            owner: RxLine::Modem,
            window_opened_ms: 0,
            window_closed_ms: 0,
        }
    }

    /// Current owner of the receive path
    pub fn owner(&self) -> RxLine {
        self.owner
    }

    /// True when the modem has held the line long enough for a GPS window
    ///
    /// The interval is measured from the end of the previous window, and must
    /// be strictly exceeded.
    pub fn window_due(&self, now_ms: u64) -> bool {
        self.owner == RxLine::Modem
            && now_ms - self.window_closed_ms > u64::from(self.interval_ms)
    }

    /// Hand the receive path to the GPS
    ///
    /// # Errors
    ///
    /// Returns an error if the switch rejects the selection.
    pub fn open_window<S: RxSwitchInterface>(
        &mut self,
        switch: &mut S,
        now_ms: u64,
    ) -> Result<()> {
        switch.listen(RxLine::Gps)?;
        self.owner = RxLine::Gps;
        self.window_opened_ms = now_ms;
        crate::log_trace!("Mux: GPS window open");
        Ok(())
    }

    /// True once the open window has run its course
    pub fn window_elapsed(&self, now_ms: u64) -> bool {
        now_ms - self.window_opened_ms >= u64::from(self.window_ms)
    }

    /// Return the receive path to the modem, closing the window
    ///
    /// # Errors
    ///
    /// Returns an error if the switch rejects the selection.
    pub fn close_window<S: RxSwitchInterface>(
        &mut self,
        switch: &mut S,
        now_ms: u64,
    ) -> Result<()> {
        switch.listen(RxLine::Modem)?;
        self.owner = RxLine::Modem;
        self.window_closed_ms = now_ms;
        crate::log_trace!("Mux: GPS window closed");
        Ok(())
    }

    /// Select the modem without window bookkeeping (boot-time focus)
    ///
    /// # Errors
    ///
    /// Returns an error if the switch rejects the selection.
    pub fn focus_modem<S: RxSwitchInterface>(&mut self, switch: &mut S) -> Result<()> {
        switch.listen(RxLine::Modem)?;
        self.owner = RxLine::Modem;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockRxBus, MockSwitch};

    #[test]
    fn test_interval_must_be_strictly_exceeded() {
        let mut mux = RxMultiplexer::new(100, 200);
        let mut switch = MockSwitch::new();

        mux.open_window(&mut switch, 900).unwrap();
        mux.close_window(&mut switch, 1000).unwrap();

        assert!(!mux.window_due(1200));
        assert!(mux.window_due(1201));
    }

    #[test]
    fn test_no_window_while_gps_owns_the_line() {
        let mut mux = RxMultiplexer::new(100, 200);
        let mut switch = MockSwitch::new();

        mux.open_window(&mut switch, 500).unwrap();
        assert_eq!(mux.owner(), RxLine::Gps);
        assert!(!mux.window_due(5000));
    }

    #[test]
    fn test_window_lifecycle_drives_the_switch() {
        let mut mux = RxMultiplexer::new(100, 200);
        let mut switch = MockSwitch::new();

        assert!(mux.window_due(201));
        mux.open_window(&mut switch, 300).unwrap();
        assert_eq!(switch.active(), RxLine::Gps);

        assert!(!mux.window_elapsed(399));
        assert!(mux.window_elapsed(400));

        mux.close_window(&mut switch, 400).unwrap();
        assert_eq!(switch.active(), RxLine::Modem);
        assert_eq!(mux.owner(), RxLine::Modem);
        assert_eq!(switch.transitions(), 2);

        // Next window is measured from the close at 400
        assert!(!mux.window_due(600));
        assert!(mux.window_due(601));
    }

    #[test]
    fn test_modem_bytes_lost_during_window() {
        let bus = MockRxBus::new();
        let mut switch = bus.switch();
        let mut mux = RxMultiplexer::new(100, 200);

        mux.open_window(&mut switch, 300).unwrap();
        bus.inject(RxLine::Modem, b"+CMT: missed");
        bus.inject(RxLine::Gps, b"$GPGGA");
        mux.close_window(&mut switch, 400).unwrap();

        assert_eq!(bus.dropped(RxLine::Modem), 12);
        assert_eq!(bus.dropped(RxLine::Gps), 0);
    }
}
