use std::time::Duration;

use super::rc_lines::{EdgeWait, RcLines};
use crate::configuration::rc_configuration::RcConfiguration;

pub const DEFAULT_SOURCE_VOLTAGE: f64 = 5.0;

/// Source voltage given on the command line, `DEFAULT_SOURCE_VOLTAGE` when absent or not a number.
pub fn source_voltage_from_arg(arg: Option<&str>) -> f64 {
    match arg.map(str::parse::<f64>) {
        Some(Ok(voltage)) => voltage,
        Some(Err(_)) => {
            log::warn!("Ignoring non numeric source voltage {:?}", arg);
            DEFAULT_SOURCE_VOLTAGE
        }
        None => DEFAULT_SOURCE_VOLTAGE,
    }
}

/// An ideal RC network charging from a fixed source voltage, on a virtual clock.
///
/// Delays and waits advance the clock instead of sleeping, so a whole
/// measurement runs instantly.
pub struct SimulatedRcLines {
    source_voltage: f64,
    trig_level: f64,
    time_constant: f64,
    control_active: bool,
    clock: Duration,
}

impl SimulatedRcLines {
    pub fn new(source_voltage: f64, config: &RcConfiguration) -> Self {
        Self {
            source_voltage,
            trig_level: config.trig_level,
            time_constant: config.time_constant(),
            control_active: false,
            clock: Duration::ZERO,
        }
    }

    pub fn is_control_active(&self) -> bool {
        self.control_active
    }

    /// Time for the capacitor to charge up to the trigger level, `None` if it never does.
    pub fn crossing_time(&self) -> Option<Duration> {
        if !(self.source_voltage > self.trig_level) || !self.source_voltage.is_finite() {
            return None;
        }

        let t = -self.time_constant * (1.0 - self.trig_level / self.source_voltage).ln();
        Some(Duration::from_secs_f64(t))
    }
}

impl RcLines for SimulatedRcLines {
    fn set_control(&mut self, active: bool) -> anyhow::Result<()> {
        self.control_active = active;
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        self.clock += duration;
    }

    fn wait_falling_edge(&mut self, timeout: Duration) -> anyhow::Result<EdgeWait> {
        // a capacitor held in discharge never reaches the trigger level
        let crossing = if self.control_active {
            None
        } else {
            self.crossing_time()
        };

        match crossing {
            Some(t) if t < timeout => {
                self.clock += t;
                Ok(EdgeWait::Edge)
            }
            _ => {
                self.clock += timeout;
                Ok(EdgeWait::Timeout)
            }
        }
    }

    fn now(&self) -> Duration {
        self.clock
    }
}
