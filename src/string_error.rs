use std::fmt;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

#[derive(Debug)]
pub struct StringError(pub &'static str);

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for StringError {}

#[cfg(target_os = "espidf")]
#[derive(Debug)]
pub struct StringEspError(pub &'static str, pub EspError);

#[cfg(target_os = "espidf")]
impl fmt::Display for StringEspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0, self.1)
    }
}

#[cfg(target_os = "espidf")]
impl std::error::Error for StringEspError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.1)
    }
}
