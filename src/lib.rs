//! Analog voltage measurement on two digital pins.
//!
//! A control pin discharges a capacitor, then the time the capacitor takes to
//! charge back to a comparator threshold gives the voltage applied to the RC
//! network. Useful on boards without a spare ADC input.

pub mod board;
pub mod configuration;
pub mod sensors;
pub mod string_error;
