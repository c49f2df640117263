pub mod rc_voltage_sensor;
pub mod sensor;
pub mod statistics;
