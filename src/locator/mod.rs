//! Locator control loop
//!
//! Ties the components together: the receive-path multiplexer rations
//! listening time between GPS and modem, the modem driver accumulates
//! inbound notifications, the interpreter decides whether a notification is
//! a position request, and the reply composer answers it. An operator
//! console mirrors modem traffic and accepts a manual trigger.
//!
//! The loop is synchronous and single-owner: every peripheral is moved into
//! [`Locator`] at construction and nothing is shared, so the same code runs
//! unchanged against hardware implementations or the mock platform.

pub mod command;
pub mod config;
pub mod console;
pub mod mux;
pub mod reply;

pub use command::CommandInterpreter;
pub use config::LocatorConfig;
pub use console::{Console, ConsoleCommand};
pub use mux::RxMultiplexer;

use crate::devices::gps::{Fix, GpsReceiver};
use crate::devices::modem::{protocol, ModemDriver, UrcPoll};
use crate::platform::{
    traits::{GpioInterface, RxSwitchInterface, TimerInterface, UartInterface},
    Result,
};

/// SMS-queryable GPS locator
///
/// Owns the three serial lines (GPS, modem, console), the receive-path
/// switch, the timer, and the status LED. Call [`Locator::boot`] once, then
/// either [`Locator::run`] or repeated [`Locator::run_cycle`].
pub struct Locator<GpsUart, ModemUart, ConsoleUart, Switch, Timer, Led>
where
    GpsUart: UartInterface,
    ModemUart: UartInterface,
    ConsoleUart: UartInterface,
    Switch: RxSwitchInterface,
    Timer: TimerInterface,
    Led: GpioInterface,
{
    config: LocatorConfig,
    gps: GpsReceiver<GpsUart>,
    modem: ModemDriver<ModemUart>,
    console: Console<ConsoleUart>,
    switch: Switch,
    timer: Timer,
    status_led: Led,
    mux: RxMultiplexer,
    interpreter: CommandInterpreter,
    network_registered: bool,
}

impl<GpsUart, ModemUart, ConsoleUart, Switch, Timer, Led>
    Locator<GpsUart, ModemUart, ConsoleUart, Switch, Timer, Led>
where
    GpsUart: UartInterface,
    ModemUart: UartInterface,
    ConsoleUart: UartInterface,
    Switch: RxSwitchInterface,
    Timer: TimerInterface,
    Led: GpioInterface,
{
    /// Assemble a locator from its peripherals
    pub fn new(
        gps_uart: GpsUart,
        modem_uart: ModemUart,
        console_uart: ConsoleUart,
        switch: Switch,
        timer: Timer,
        status_led: Led,
        config: LocatorConfig,
    ) -> Self {
        Self {
            gps: GpsReceiver::new(gps_uart),
            modem: ModemDriver::new(modem_uart, config.modem),
            console: Console::new(console_uart),
            switch,
            timer,
            status_led,
            mux: RxMultiplexer::new(config.gps_window_ms, config.gps_window_interval_ms),
            interpreter: CommandInterpreter::new(config.default_recipient),
            network_registered: false,
            config,
        }
    }

    /// Power-up sequence: configure the modem and check registration
    ///
    /// Waits out the modem's power-up, points the receive path at it, then
    /// issues the configuration commands: liveness ping, text mode,
    /// notification routing, stored-message purge. Finishes with a network
    /// registration query; the result drives the status LED (active-low) and
    /// is remembered, but an unregistered modem does not abort boot since
    /// registration often completes later.
    ///
    /// # Errors
    ///
    /// Returns an error if a peripheral fails during the sequence.
    pub fn boot(&mut self) -> Result<()> {
        self.console.write_line("SMS locator starting")?;
        crate::log_info!("Boot: waiting {} ms for modem power-up", self.config.boot_wait_ms);
        self.timer.delay_ms(self.config.boot_wait_ms)?;

        self.mux.focus_modem(&mut self.switch)?;

        self.modem.send_command("AT")?;
        self.timer.delay_ms(self.config.command_settle_ms)?;
        self.modem.send_command("AT+CMGF=1")?;
        self.timer.delay_ms(self.config.command_settle_ms)?;
        self.modem.send_command("AT+CNMI=2,2,0,0,0")?;
        self.timer.delay_ms(self.config.command_settle_ms)?;
        self.modem.send_command("AT+CMGDA=\"DEL ALL\"")?;
        self.timer.delay_ms(self.config.purge_settle_ms)?;

        self.modem.send_command("AT+CREG?")?;
        let response = self
            .modem
            .read_response(&mut self.timer, self.config.command_settle_ms)?;

        self.network_registered = protocol::registration_ok(&response);
        if self.network_registered {
            crate::log_info!("Boot: network registered");
            self.status_led.set_low()?;
        } else {
            crate::log_warn!("Boot: no network registration yet");
            self.status_led.set_high()?;
            self.console.write_bytes(&response)?;
        }

        self.console.write_line("READY")?;
        self.console.write_line("Send 'CHECK' via SMS to get position")?;
        Ok(())
    }

    /// One pass of the control loop
    ///
    /// Opens a GPS listening window when one is due, then gives the modem
    /// the rest of the pass: accumulate notifications, process the buffer
    /// when a notification (or an overflow) demands it, and finally poll the
    /// console for a manual trigger.
    ///
    /// # Errors
    ///
    /// Returns an error if a peripheral fails; [`Locator::run`] absorbs
    /// these, a caller driving cycles directly may react differently.
    pub fn run_cycle(&mut self) -> Result<()> {
        let now = self.timer.now_ms();
        if self.mux.window_due(now) {
            self.mux.open_window(&mut self.switch, now)?;
            let mut fed: usize = 0;
            while !self.mux.window_elapsed(self.timer.now_ms()) {
                fed += self.gps.pump()?;
                self.timer.delay_ms(1)?;
            }
            let closed_at = self.timer.now_ms();
            self.mux.close_window(&mut self.switch, closed_at)?;
            if fed > 0 {
                crate::log_trace!("GPS window fed {} bytes", fed);
            }
        }

        match self.modem.poll_urc(&mut self.timer, self.console.uart_mut())? {
            UrcPoll::Notification => self.process_buffer()?,
            UrcPoll::Overflow => {
                crate::log_warn!("Modem: buffer past threshold, forcing a pass");
                self.process_buffer()?;
            }
            UrcPoll::Quiet | UrcPoll::Timeout => {}
        }

        if let Some(ConsoleCommand::Check) = self.console.poll_command()? {
            self.console.write_line("Manual trigger")?;
            self.send_position_reply()?;
        }
        Ok(())
    }

    /// Run the control loop forever, absorbing cycle errors
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.run_cycle() {
                crate::log_error!("Cycle failed: {}", e);
            }
        }
    }

    /// Examine the accumulated notification and reply when it asks for it
    fn process_buffer(&mut self) -> Result<()> {
        self.console.write_line("Incoming notification:")?;
        self.console.write_bytes(self.modem.buffer())?;
        self.console.write_line("")?;

        if self.interpreter.process(self.modem.buffer()) {
            crate::log_info!("Command: position request received");
            self.timer.delay_ms(self.config.pre_send_settle_ms)?;
            self.send_position_reply()?;
        }
        self.modem.clear_buffer();
        Ok(())
    }

    /// Compose the position reply and send it to the current recipient
    fn send_position_reply(&mut self) -> Result<()> {
        let message = reply::compose(&self.gps.fix());
        self.console.write_line("Replying:")?;
        self.console.write_line(&message)?;
        self.modem.send_message(
            &mut self.timer,
            self.console.uart_mut(),
            self.interpreter.recipient(),
            &message,
        )?;
        Ok(())
    }

    /// Latest GPS fix
    pub fn fix(&self) -> Fix {
        self.gps.fix()
    }

    /// Current reply recipient
    pub fn recipient(&self) -> &str {
        self.interpreter.recipient()
    }

    /// Result of the boot-time registration query
    pub fn network_registered(&self) -> bool {
        self.network_registered
    }
}
