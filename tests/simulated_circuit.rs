use esp_rc_voltmeter::{
    board::simulated_rc_lines::SimulatedRcLines,
    configuration::rc_configuration::RcConfiguration,
    sensors::rc_voltage_sensor::{ErrorCode, RcVoltageSensor},
};

fn measure_source(voltage: f64, sample_count: usize) -> (f64, ErrorCode) {
    let config = RcConfiguration::default();
    let lines = SimulatedRcLines::new(voltage, &config);
    let mut sensor = RcVoltageSensor::new(lines, config).unwrap();

    let measurement = sensor.measure(sample_count).unwrap();
    (measurement.voltage, measurement.error)
}

#[test]
fn recovers_the_source_voltage_across_the_range() {
    for source in [2.7, 3.3, 5.0, 9.0, 12.0, 15.0] {
        let (voltage, error) = measure_source(source, 10);

        assert_eq!(error, ErrorCode::Ok);
        assert!(
            (voltage - source).abs() < 1e-3,
            "measured {voltage} V for a {source} V source"
        );
    }
}

#[test]
fn source_below_trigger_level_reports_no_edge() {
    let (voltage, error) = measure_source(1.8, 10);

    assert_eq!(error, ErrorCode::NoEdgeDetected);
    assert_eq!(voltage, 0.0);
}

#[test]
fn control_line_rests_inactive_between_readings() {
    let config = RcConfiguration::default();
    let lines = SimulatedRcLines::new(5.0, &config);
    let mut sensor = RcVoltageSensor::new(lines, config).unwrap();

    sensor.measure(3).unwrap();
    assert!(!sensor.lines().is_control_active());
}
