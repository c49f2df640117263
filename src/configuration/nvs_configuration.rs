use std::sync::atomic::{AtomicBool, Ordering};

use esp_idf_svc::nvs::{EspCustomNvsPartition, EspNvs, NvsCustom};

use super::{
    main_configuration::*,
    rc_configuration::RcConfiguration,
};
use crate::string_error::{StringError, StringEspError};

static IS_NVS_TAKEN: AtomicBool = AtomicBool::new(false);

const PARTITION_NAME: &str = "config";
const NAMESPACE: &str = "config";

pub struct NvsConfiguration {
    nvs: EspNvs<NvsCustom>,
}

impl NvsConfiguration {
    pub fn new() -> Result<Self, StringError> {
        if IS_NVS_TAKEN.swap(true, Ordering::AcqRel) {
            return Err(StringError("NvsConfiguration already taken"));
        }

        let nvs_custom = match EspCustomNvsPartition::take(PARTITION_NAME) {
            Ok(nvs) => nvs,
            Err(_) => {
                IS_NVS_TAKEN.store(false, Ordering::Release);
                return Err(StringError("Fail to take partition"));
            }
        };

        match EspNvs::new(nvs_custom, NAMESPACE, true) {
            Ok(nvs) => Ok(Self { nvs }),
            Err(_) => {
                IS_NVS_TAKEN.store(false, Ordering::Release);
                Err(StringError("Failed to create EspNvs. Bad namespace ?"))
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.nvs.contains(KEY_R1).unwrap_or(false)
    }

    /// Write every circuit constant, so the partition can be edited in place later on.
    pub fn store_rc_configuration(
        &mut self,
        name: &str,
        config: &RcConfiguration,
    ) -> Result<(), StringEspError> {
        self.store_string(KEY_NAME, name, NAME_MAX_LEN)?;
        self.store_u8(KEY_PIN_CONTROL, config.pin_control)?;
        self.store_u8(KEY_PIN_MEASURE, config.pin_measure)?;
        self.store_float(KEY_TRIG_LEVEL, config.trig_level as f32)?;
        self.store_float(KEY_R1, config.r1 as f32)?;
        self.store_float(KEY_C1, config.c1 as f32)?;
        self.store_u32(KEY_PULSE_US, stored_pulse_us(config.pulse_width))?;
        self.store_float(KEY_FILTER, config.filter as f32)?;
        self.store_u8(KEY_SAMPLES, stored_sample_count(config.sample_count))
    }

    pub fn store_string(
        &mut self,
        key: &str,
        value: &str,
        max_size: usize,
    ) -> Result<(), StringEspError> {
        self.nvs
            .remove(key)
            .map_err(|e| StringEspError("Failed to erase key", e))?;
        self.nvs
            .set_str(key, &trunc_pad_string(value, max_size))
            .map_err(|e| StringEspError("Failed to store string", e))
    }

    pub fn store_float(&mut self, key: &str, value: f32) -> Result<(), StringEspError> {
        self.store_u32(key, u32::from_ne_bytes(value.to_ne_bytes()))
    }

    pub fn store_u8(&mut self, key: &str, value: u8) -> Result<(), StringEspError> {
        self.nvs
            .remove(key)
            .map_err(|e| StringEspError("Failed to erase key", e))?;
        self.nvs
            .set_u8(key, value)
            .map_err(|e| StringEspError("Failed to store U8", e))
    }

    pub fn store_u32(&mut self, key: &str, value: u32) -> Result<(), StringEspError> {
        self.nvs
            .remove(key)
            .map_err(|e| StringEspError("Failed to erase key", e))?;
        self.nvs
            .set_u32(key, value)
            .map_err(|e| StringEspError("Failed to store U32", e))
    }

}

impl ConfigStore for NvsConfiguration {
    fn read_string(&self, key: &str, default: &str) -> String {
        let size = self.nvs.str_len(key).unwrap_or(None).unwrap_or(0);

        if size == 0 {
            return default.to_string();
        }

        let mut buf = vec![0; size];

        match self.nvs.get_str(key, &mut buf).unwrap_or(None) {
            Some(value) => strip_padding(value).to_owned(),
            None => default.to_string(),
        }
    }

    fn read_float(&self, key: &str, default: f32) -> f32 {
        match self.nvs.get_u32(key).unwrap_or(None) {
            Some(value) => f32::from_ne_bytes(value.to_ne_bytes()),
            None => default,
        }
    }

    fn read_u8(&self, key: &str, default: u8) -> u8 {
        self.nvs.get_u8(key).unwrap_or(None).unwrap_or(default)
    }

    fn read_u32(&self, key: &str, default: u32) -> u32 {
        self.nvs.get_u32(key).unwrap_or(None).unwrap_or(default)
    }

    fn read_u64(&self, key: &str, default: u64) -> u64 {
        self.nvs.get_u64(key).unwrap_or(None).unwrap_or(default)
    }
}

impl Drop for NvsConfiguration {
    fn drop(&mut self) {
        IS_NVS_TAKEN.store(false, Ordering::Release);
    }
}
