//! Mock GPIO implementation for testing

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode},
    Result,
};

/// Mock GPIO implementation
///
/// Tracks pin state (high/low) and mode for test verification. Tests of the
/// status LED read the recorded level directly; remember the LED is wired
/// active-low, so `read() == false` means lit.
#[derive(Debug)]
pub struct MockGpio {
    state: bool,
    mode: GpioMode,
}

impl MockGpio {
    /// Create a new mock GPIO in output mode
    pub fn new_output() -> Self {
        Self {
            state: false,
            mode: GpioMode::OutputPushPull,
        }
    }

    /// Create a new mock GPIO in input mode
    pub fn new_input() -> Self {
        Self {
            state: false,
            mode: GpioMode::Input,
        }
    }

    /// Set the input state (for simulating input pin reads)
    pub fn set_input_state(&mut self, high: bool) {
        self.state = high;
    }
}

impl GpioInterface for MockGpio {
    fn set_high(&mut self) -> Result<()> {
        match self.mode {
            GpioMode::OutputPushPull | GpioMode::OutputOpenDrain => {
                self.state = true;
                Ok(())
            }
            _ => Err(PlatformError::Gpio(GpioError::InvalidMode)),
        }
    }

    fn set_low(&mut self) -> Result<()> {
        match self.mode {
            GpioMode::OutputPushPull | GpioMode::OutputOpenDrain => {
                self.state = false;
                Ok(())
            }
            _ => Err(PlatformError::Gpio(GpioError::InvalidMode)),
        }
    }

    fn toggle(&mut self) -> Result<()> {
        match self.mode {
            GpioMode::OutputPushPull | GpioMode::OutputOpenDrain => {
                self.state = !self.state;
                Ok(())
            }
            _ => Err(PlatformError::Gpio(GpioError::InvalidMode)),
        }
    }

    fn read(&self) -> bool {
        self.state
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
