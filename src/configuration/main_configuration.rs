use std::time::Duration;

use pad::{Alignment, PadStr};

use super::rc_configuration::RcConfiguration;

pub const PAD_CHAR: char = 0x03 as char;

pub const KEY_NAME: &str = "NAME";
pub const KEY_SLEEP: &str = "SLEEP";

pub const KEY_PIN_CONTROL: &str = "PINCMD";
pub const KEY_PIN_MEASURE: &str = "PINMES";
pub const KEY_TRIG_LEVEL: &str = "TRIG";
pub const KEY_R1: &str = "R1";
pub const KEY_C1: &str = "C1";
pub const KEY_PULSE_US: &str = "PULSE_US";
pub const KEY_FILTER: &str = "FILTER";
pub const KEY_SAMPLES: &str = "NSAMPLES";

pub const NAME_MAX_LEN: usize = 32;
pub const DEFAULT_NAME: &str = "rc-voltmeter";
pub const DEFAULT_SLEEP_US: u64 = 3600_000_000;

/// Read side of a key/value configuration store. Every read falls back to `default`.
pub trait ConfigStore {
    fn read_string(&self, key: &str, default: &str) -> String;
    fn read_float(&self, key: &str, default: f32) -> f32;
    fn read_u8(&self, key: &str, default: u8) -> u8;
    fn read_u32(&self, key: &str, default: u32) -> u32;
    fn read_u64(&self, key: &str, default: u64) -> u64;

    fn get_name(&self) -> String {
        self.read_string(KEY_NAME, DEFAULT_NAME)
    }

    fn get_deep_sleep_duration(&self) -> u64 {
        self.read_u64(KEY_SLEEP, DEFAULT_SLEEP_US)
    }
}

impl RcConfiguration {
    /// Build the circuit constants from a store, missing keys keep their reference value.
    pub fn load(store: &impl ConfigStore) -> Self {
        let default = Self::default();

        Self {
            pin_control: store.read_u8(KEY_PIN_CONTROL, default.pin_control),
            pin_measure: store.read_u8(KEY_PIN_MEASURE, default.pin_measure),
            trig_level: store.read_float(KEY_TRIG_LEVEL, default.trig_level as f32) as f64,
            r1: store.read_float(KEY_R1, default.r1 as f32) as f64,
            c1: store.read_float(KEY_C1, default.c1 as f32) as f64,
            pulse_width: Duration::from_micros(
                store.read_u32(KEY_PULSE_US, stored_pulse_us(default.pulse_width)) as u64,
            ),
            filter: store.read_float(KEY_FILTER, default.filter as f32) as f64,
            sample_count: store.read_u8(KEY_SAMPLES, stored_sample_count(default.sample_count))
                as usize,
        }
    }
}

/// Pulse width as stored in NVS, saturating at `u32::MAX` microseconds.
pub fn stored_pulse_us(pulse_width: Duration) -> u32 {
    u32::try_from(pulse_width.as_micros()).unwrap_or(u32::MAX)
}

/// Sample count as stored in NVS, saturating at `u8::MAX`.
pub fn stored_sample_count(sample_count: usize) -> u8 {
    u8::try_from(sample_count).unwrap_or(u8::MAX)
}

pub fn trunc_pad_string(s: &str, max: usize) -> String {
    s.pad(max, PAD_CHAR, Alignment::Left, true)
}

pub fn strip_padding(s: &str) -> &str {
    s.split_once(PAD_CHAR).map_or(s, |(value, _)| value)
}
