#[cfg(target_os = "espidf")]
pub mod esp_rc_lines;
pub mod rc_lines;
pub mod simulated_rc_lines;
