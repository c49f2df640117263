use esp_rc_voltmeter::{
    board::rc_lines::RcLines,
    configuration::{main_configuration::ConfigStore, rc_configuration::RcConfiguration},
    sensors::rc_voltage_sensor::{ErrorCode, Measurement, RcVoltageSensor},
};
use log::info;
use serde_json::{json, Map, Value};

fn log_measurement(measurement: &Measurement) {
    match measurement.error {
        ErrorCode::Ok => info!(
            "{} -> la tension sur l'entrée de mesure est de: {:.1} [V]",
            measurement.message, measurement.voltage
        ),
        ErrorCode::NoEdgeDetected => info!(
            "{} -> Pas de tension détectée sur l'entrée de mesure",
            measurement.message
        ),
        ErrorCode::InsufficientSamples => info!(
            "{} -> le nombre de mesures doit être >= 2",
            measurement.message
        ),
    }
}

fn run<L: RcLines>(
    store: &impl ConfigStore,
    config: RcConfiguration,
    lines: L,
) -> anyhow::Result<Measurement> {
    let mut sensor = RcVoltageSensor::new(lines, config)?;

    let measurement = sensor.measure(sensor.config().sample_count)?;
    log_measurement(&measurement);

    let mut sensors = Map::new();
    measurement.add_json_value(&mut sensors);

    let report = json!({
        "name": store.get_name(),
        "sensors": Value::Object(sensors),
    });
    info!("Report: {report}");

    Ok(measurement)
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_svc::sys::esp_deep_sleep;
    use esp_rc_voltmeter::{
        board::esp_rc_lines::EspRcLines, configuration::nvs_configuration::NvsConfiguration,
    };

    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let mut nvs_config = NvsConfiguration::new()?;
    let config = RcConfiguration::load(&nvs_config);

    if !nvs_config.is_initialized() {
        info!("First boot, storing reference circuit constants");
        let name = nvs_config.get_name();
        nvs_config.store_rc_configuration(&name, &config)?;
    }

    // Nothing else in this firmware drives these GPIOs.
    let lines = unsafe { EspRcLines::from_gpio_numbers(config.pin_control, config.pin_measure)? };

    run(&nvs_config, config, lines)?;

    info!("Going to sleep !");

    unsafe {
        esp_deep_sleep(nvs_config.get_deep_sleep_duration());
    }

    #[allow(unreachable_code)]
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use esp_rc_voltmeter::board::simulated_rc_lines::{source_voltage_from_arg, SimulatedRcLines};

    struct DefaultStore;

    impl ConfigStore for DefaultStore {
        fn read_string(&self, _key: &str, default: &str) -> String {
            default.to_string()
        }

        fn read_float(&self, _key: &str, default: f32) -> f32 {
            default
        }

        fn read_u8(&self, _key: &str, default: u8) -> u8 {
            default
        }

        fn read_u32(&self, _key: &str, default: u32) -> u32 {
            default
        }

        fn read_u64(&self, _key: &str, default: u64) -> u64 {
            default
        }
    }

    let source_voltage = source_voltage_from_arg(std::env::args().nth(1).as_deref());

    let store = DefaultStore;
    let config = RcConfiguration::load(&store);
    let lines = SimulatedRcLines::new(source_voltage, &config);

    let measurement = run(&store, config, lines)?;
    println!(
        "{:.1} V (code {}: {})",
        measurement.voltage,
        measurement.error.code(),
        measurement.message
    );

    Ok(())
}
