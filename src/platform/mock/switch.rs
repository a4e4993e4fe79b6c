//! Mock receive-path switch for testing

use crate::platform::{
    traits::{RxLine, RxSwitchInterface},
    Result,
};

/// Mock receive-path switch
///
/// Records the selected line and counts transitions. Use this when a test
/// only cares about ownership policy; use [`super::MockRxBus`] when it needs
/// actual byte delivery and loss on the shared path.
#[derive(Debug)]
pub struct MockSwitch {
    active: RxLine,
    transitions: usize,
}

impl MockSwitch {
    /// Create a new mock switch, initially listening to the modem
    pub fn new() -> Self {
        Self {
            active: RxLine::Modem,
            transitions: 0,
        }
    }

    /// Number of `listen` calls observed
    pub fn transitions(&self) -> usize {
        self.transitions
    }
}

impl Default for MockSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl RxSwitchInterface for MockSwitch {
    fn listen(&mut self, line: RxLine) -> Result<()> {
        self.active = line;
        self.transitions += 1;
        Ok(())
    }

    fn active(&self) -> RxLine {
        self.active
    }
}
