pub mod main_configuration;
#[cfg(target_os = "espidf")]
pub mod nvs_configuration;
pub mod rc_configuration;
