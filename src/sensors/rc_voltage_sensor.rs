use std::time::Duration;

use serde_json::json;

use super::{sensor::Sensor, statistics};
use crate::{
    board::rc_lines::{EdgeWait, RcLines},
    configuration::rc_configuration::RcConfiguration,
};

/// Fewer samples leave the standard deviation undefined.
pub const MIN_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Ok,
    NoEdgeDetected,
    InsufficientSamples,
}

impl ErrorCode {
    pub fn code(self) -> u8 {
        match self {
            ErrorCode::Ok => 0,
            ErrorCode::NoEdgeDetected => 1,
            ErrorCode::InsufficientSamples => 2,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Ok => "Measure ok",
            ErrorCode::NoEdgeDetected => "Timeout, no voltage on the measure pin",
            ErrorCode::InsufficientSamples => "Sample count must be at least 2",
        }
    }
}

/// Outcome of one call to [`RcVoltageSensor::measure`]. `voltage` is 0 unless `error` is `Ok`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub voltage: f64,
    pub error: ErrorCode,
    pub message: &'static str,
}

impl Measurement {
    fn ok(voltage: f64) -> Self {
        Self {
            voltage,
            error: ErrorCode::Ok,
            message: ErrorCode::Ok.message(),
        }
    }

    fn failed(error: ErrorCode) -> Self {
        Self {
            voltage: 0.0,
            error,
            message: error.message(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error == ErrorCode::Ok
    }

    /// Insert `voltage`, `error` and `message` into a JSON report.
    pub fn add_json_value(&self, map: &mut serde_json::Map<String, serde_json::Value>) {
        map.insert("voltage".to_string(), json!(self.voltage));
        map.insert("error".to_string(), json!(self.error.code()));
        map.insert("message".to_string(), json!(self.message));
    }
}

/// Voltage reader built on two digital pins and an RC network.
///
/// Each sample discharges the capacitor through the control line, then times how
/// long the capacitor takes to charge back up to the comparator trigger level.
/// The lower the voltage, the longer a sample takes. The lines are released when
/// the sensor is dropped.
pub struct RcVoltageSensor<L: RcLines> {
    lines: L,
    config: RcConfiguration,
}

impl<L: RcLines> RcVoltageSensor<L> {
    pub fn new(mut lines: L, config: RcConfiguration) -> anyhow::Result<Self> {
        config.validate()?;
        lines.set_control(false)?;

        Ok(Self { lines, config })
    }

    pub fn config(&self) -> &RcConfiguration {
        &self.config
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Filtered voltage estimate over `sample_count` samples.
    ///
    /// A single sample without a falling edge aborts the whole reading. `Err` is kept
    /// for GPIO faults and broken internal invariants.
    pub fn measure(&mut self, sample_count: usize) -> anyhow::Result<Measurement> {
        if sample_count < MIN_SAMPLES {
            log::warn!("Refusing to measure with {sample_count} sample(s)");
            return Ok(Measurement::failed(ErrorCode::InsufficientSamples));
        }

        let mut l_elapsed = Vec::with_capacity(sample_count);

        for idx in 0..sample_count {
            match self.read_raw_value()? {
                Some(elapsed) => {
                    log::debug!("Sample #{idx}: {} us", elapsed.as_micros());
                    l_elapsed.push(elapsed.as_secs_f64());
                }
                None => {
                    log::warn!("Sample #{idx}: no falling edge before timeout");
                    return Ok(Measurement::failed(ErrorCode::NoEdgeDetected));
                }
            }
        }

        let elapsed_mean = statistics::filtered_mean(&l_elapsed, self.config.filter)?;
        let voltage = self.config.voltage_from_elapsed(elapsed_mean)?;

        log::info!("Measured {voltage:.2} V over {sample_count} samples");
        Ok(Measurement::ok(voltage))
    }

    /// One discharge pulse and the charge time that follows, `None` on timeout.
    pub fn read_raw_value(&mut self) -> anyhow::Result<Option<Duration>> {
        self.lines.set_control(true)?;
        self.lines.delay(self.config.pulse_width);
        self.lines.set_control(false)?;

        let start_measure = self.lines.now();

        match self.lines.wait_falling_edge(self.config.timeout())? {
            EdgeWait::Edge => Ok(Some(self.lines.now().saturating_sub(start_measure))),
            EdgeWait::Timeout => Ok(None),
        }
    }
}

impl<L: RcLines> Drop for RcVoltageSensor<L> {
    fn drop(&mut self) {
        if let Err(e) = self.lines.release() {
            log::error!("Failed to release RC lines: {e}");
        }
    }
}

impl<L: RcLines> Sensor for RcVoltageSensor<L> {
    fn add_json_value(
        &mut self,
        map: &mut serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<()> {
        self.measure(self.config.sample_count)?.add_json_value(map);
        Ok(())
    }

    fn pretty_print(&mut self) -> anyhow::Result<String> {
        let measurement = self.measure(self.config.sample_count)?;

        Ok(format!(
            "Voltage: {:.1} V ({}, code {})",
            measurement.voltage,
            measurement.message,
            measurement.error.code()
        ))
    }
}
