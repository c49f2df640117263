use std::time::Duration;

use anyhow::bail;

use crate::string_error::StringError;

pub const DEFAULT_PIN_CONTROL: u8 = 8;
pub const DEFAULT_PIN_MEASURE: u8 = 10;
pub const DEFAULT_TRIG_LEVEL: f64 = 2.5;
pub const DEFAULT_R1: f64 = 100e3;
pub const DEFAULT_C1: f64 = 1e-6;
pub const DEFAULT_PULSE_WIDTH: Duration = Duration::from_millis(10);
pub const DEFAULT_FILTER: f64 = 1.5;
pub const DEFAULT_SAMPLE_COUNT: usize = 10;

/// Timeout of one sample, in RC time constants.
pub const TIMEOUT_RC_FACTOR: f64 = 10.0;

/// Smallest filter threshold for which the z-score filter always keeps a sample.
///
/// The mean squared deviation over `n` samples is `(n - 1) / n * st_dev^2`, at most
/// `st_dev^2`, so at least one sample lies within one standard deviation of the mean.
pub const MIN_FILTER: f64 = 1.0;

/// Longest discharge pulse, the pulse is timed in `u32` microseconds.
pub const MAX_PULSE_WIDTH: Duration = Duration::from_micros(u32::MAX as u64);

/// Constants of the RC measuring circuit.
///
/// The measuring range starts just above `trig_level` (about `trig_level + 0.2` V)
/// and reaches more than 15 V. Precision is about +/- 0.2 V.
#[derive(Debug, Clone, PartialEq)]
pub struct RcConfiguration {
    /// GPIO driving the discharge transistor.
    pub pin_control: u8,
    /// GPIO wired to the comparator output.
    pub pin_measure: u8,
    /// Comparator reference voltage, in volts.
    pub trig_level: f64,
    /// Resistor of the RC network, in ohms.
    pub r1: f64,
    /// Capacitor of the RC network, in farads.
    pub c1: f64,
    /// Duration of the discharge pulse.
    pub pulse_width: Duration,
    /// Samples further than this many standard deviations from the mean are dropped.
    pub filter: f64,
    /// Sample count used when the caller does not pick one.
    pub sample_count: usize,
}

impl Default for RcConfiguration {
    fn default() -> Self {
        Self {
            pin_control: DEFAULT_PIN_CONTROL,
            pin_measure: DEFAULT_PIN_MEASURE,
            trig_level: DEFAULT_TRIG_LEVEL,
            r1: DEFAULT_R1,
            c1: DEFAULT_C1,
            pulse_width: DEFAULT_PULSE_WIDTH,
            filter: DEFAULT_FILTER,
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl RcConfiguration {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pin_control == self.pin_measure {
            bail!(
                "control and measure lines share GPIO {}",
                self.pin_control
            );
        }
        if !is_positive(self.trig_level) {
            bail!("trigger level must be > 0 V, got {}", self.trig_level);
        }
        if !is_positive(self.r1) {
            bail!("R1 must be > 0 ohm, got {}", self.r1);
        }
        if !is_positive(self.c1) {
            bail!("C1 must be > 0 F, got {}", self.c1);
        }
        if self.pulse_width.is_zero() || self.pulse_width > MAX_PULSE_WIDTH {
            bail!(
                "discharge pulse width must be in (0, {:?}], got {:?}",
                MAX_PULSE_WIDTH,
                self.pulse_width
            );
        }
        if !(self.filter.is_finite() && self.filter >= MIN_FILTER) {
            bail!(
                "filter must be at least {} standard deviations, got {}",
                MIN_FILTER,
                self.filter
            );
        }
        if self.sample_count < 2 {
            bail!("default sample count must be >= 2, got {}", self.sample_count);
        }

        Ok(())
    }

    /// R1 * C1, in seconds.
    pub fn time_constant(&self) -> f64 {
        self.r1 * self.c1
    }

    /// Longest wait for the falling edge of one sample: 10 RC.
    pub fn timeout(&self) -> Duration {
        let micros = (TIMEOUT_RC_FACTOR * self.time_constant() * 1e6).round();
        Duration::from_micros(micros as u64)
    }

    /// Invert `V(t) = U * (1 - exp(-t / RC))` for the source voltage `U`,
    /// knowing the capacitor reached `trig_level` after `elapsed` seconds.
    pub fn voltage_from_elapsed(&self, elapsed: f64) -> Result<f64, StringError> {
        let charge = 1.0 - (-elapsed / self.time_constant()).exp();

        if !(charge.is_finite() && charge > 0.0) {
            return Err(StringError("charge factor out of range, cannot invert RC curve"));
        }

        Ok(self.trig_level / charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_reference_circuit() {
        let config = RcConfiguration::default();

        assert!(config.validate().is_ok());
        assert!((config.time_constant() - 0.1).abs() < 1e-12);
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn validate_rejects_bad_constants() {
        let bad = [
            RcConfiguration {
                r1: 0.0,
                ..Default::default()
            },
            RcConfiguration {
                c1: -1e-6,
                ..Default::default()
            },
            RcConfiguration {
                trig_level: f64::NAN,
                ..Default::default()
            },
            RcConfiguration {
                pulse_width: Duration::ZERO,
                ..Default::default()
            },
            RcConfiguration {
                pulse_width: MAX_PULSE_WIDTH + Duration::from_micros(1),
                ..Default::default()
            },
            RcConfiguration {
                filter: 0.5,
                ..Default::default()
            },
            RcConfiguration {
                sample_count: 1,
                ..Default::default()
            },
            RcConfiguration {
                pin_measure: DEFAULT_PIN_CONTROL,
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn voltage_at_one_time_constant() {
        let config = RcConfiguration::default();
        let expected = 2.5 / (1.0 - (-1.0f64).exp());

        let voltage = config.voltage_from_elapsed(0.1).unwrap();
        assert!((voltage - expected).abs() < 1e-9);
    }

    #[test]
    fn longer_charge_means_lower_source_voltage() {
        let config = RcConfiguration::default();

        let fast = config.voltage_from_elapsed(0.02).unwrap();
        let slow = config.voltage_from_elapsed(0.2).unwrap();
        assert!(fast > slow);
        assert!(slow > config.trig_level);
    }

    #[test]
    fn zero_elapsed_cannot_be_inverted() {
        let config = RcConfiguration::default();

        assert!(config.voltage_from_elapsed(0.0).is_err());
        assert!(config.voltage_from_elapsed(-0.1).is_err());
    }
}
