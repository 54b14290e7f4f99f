//! Operator console
//!
//! Fixed-string command matching over a serial line: `lat=`, `lon=` and
//! `rad=` configure the target point, `data` reports it back. Accepted
//! commands flash the indicator fast for a few ticks, rejected input
//! flashes it slow once. No general command framework.

use crate::core::supervisor::{
    LivenessReporter, PeriodCommand, ProbeFlag, SharedPeriodControl, WorkerId,
};
use crate::platform::{Result, UartInterface, WatchdogInterface};
use crate::subsystems::locator::SharedTargetConfig;
use core::fmt::Write as _;

/// Maximum accepted command line length
pub const CONSOLE_LINE_CAPACITY: usize = 64;

/// Blink override acknowledging an accepted command
const CMD_OK_BLINK: PeriodCommand = PeriodCommand::Temporary {
    period_ms: 50,
    ticks: 10,
};

/// Blink override signalling a rejected command
const CMD_ERROR_BLINK: PeriodCommand = PeriodCommand::Temporary {
    period_ms: 2000,
    ticks: 1,
};

/// The operator console worker
///
/// Assembles command lines from received bytes and applies them to the
/// shared target configuration. Responses go back over the same UART.
pub struct Console<'a, U: UartInterface, W: WatchdogInterface> {
    uart: U,
    line: heapless::Vec<u8, CONSOLE_LINE_CAPACITY>,
    target: &'a SharedTargetConfig,
    control: &'a SharedPeriodControl,
    probe: &'a ProbeFlag,
    reporter: LivenessReporter<'a, W>,
}

impl<'a, U: UartInterface, W: WatchdogInterface> Console<'a, U, W> {
    /// Create the worker around its injected shared state
    pub fn new(
        uart: U,
        target: &'a SharedTargetConfig,
        control: &'a SharedPeriodControl,
        probe: &'a ProbeFlag,
        reporter: LivenessReporter<'a, W>,
    ) -> Self {
        Self {
            uart,
            line: heapless::Vec::new(),
            target,
            control,
            probe,
            reporter,
        }
    }

    /// Mutable access to the UART (test inspection)
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Print how to configure the target point
    pub fn print_help(&mut self) -> Result<()> {
        self.uart.write(b"config target point:\r\n")?;
        self.uart.write(b"   lat=<value>\r\n")?;
        self.uart.write(b"   lon=<value>\r\n")?;
        self.uart.write(b"config earth radius [km]:\r\n")?;
        self.uart.write(b"   rad=<value>\r\n")?;
        self.uart.write(b"get parameters:\r\n")?;
        self.uart.write(b"   data\r\n")?;
        Ok(())
    }

    /// Feed one received byte; a line terminator runs the command
    ///
    /// # Errors
    ///
    /// Propagates UART failures while writing the response.
    pub fn push_byte(&mut self, byte: u8) -> Result<()> {
        match byte {
            b'\r' | b'\n' => {
                if !self.line.is_empty() {
                    let line = core::mem::take(&mut self.line);
                    self.handle_line(&line)?;
                }
                Ok(())
            }
            _ => {
                if self.line.push(byte).is_err() {
                    // Oversized line: drop it and flag the error.
                    self.line.clear();
                    self.reject()?;
                }
                Ok(())
            }
        }
    }

    /// Answer a pending liveness probe
    pub fn answer_probe(&mut self) {
        if self.probe.take() {
            self.reporter.report(WorkerId::Console);
        }
    }

    fn handle_line(&mut self, line: &[u8]) -> Result<()> {
        let text = match core::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(_) => return self.reject(),
        };

        if text == "data" {
            return self.print_target();
        }
        if let Some(value) = text.strip_prefix("lat=") {
            return match value.parse::<f64>() {
                Ok(latitude) if self.target.set_latitude(latitude) => self.accept(),
                _ => self.reject(),
            };
        }
        if let Some(value) = text.strip_prefix("lon=") {
            return match value.parse::<f64>() {
                Ok(longitude) if self.target.set_longitude(longitude) => self.accept(),
                _ => self.reject(),
            };
        }
        if let Some(value) = text.strip_prefix("rad=") {
            return match value.parse::<f64>() {
                Ok(radius) if self.target.set_earth_radius_km(radius) => self.accept(),
                _ => self.reject(),
            };
        }
        self.reject()
    }

    fn print_target(&mut self) -> Result<()> {
        let target = self.target.snapshot();
        let mut response: heapless::String<96> = heapless::String::new();
        let _ = write!(
            response,
            "Point:[{},{}] Radius:{} Kms\r\n",
            target.latitude, target.longitude, target.earth_radius_km
        );
        self.uart.write(response.as_bytes())?;
        Ok(())
    }

    fn accept(&mut self) -> Result<()> {
        self.control.request(CMD_OK_BLINK);
        self.uart.write(b"OK\r\n")?;
        Ok(())
    }

    fn reject(&mut self) -> Result<()> {
        self.control.request(CMD_ERROR_BLINK);
        self.uart.write(b"ERROR\r\n")?;
        Ok(())
    }
}
