pub mod run_options;

use crate::{
    error::AppError,
    watering::classifier::{Calibration, Thresholds},
};
use run_options::Args;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::warn;

pub const CONFIG_FILE: &str = "./sprout.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebServer {
    pub address: String,
}

impl Default for WebServer {
    fn default() -> Self {
        Self { address: "0.0.0.0:8080".to_owned() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// sysfs file holding the raw ADC value of the soil probe
    pub moisture_adc: PathBuf,
    /// sysfs GPIO value file driving the pump relay
    pub pump_gpio: PathBuf,
    pub relay_active_low: bool,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            moisture_adc: PathBuf::from("/sys/bus/iio/devices/iio:device0/in_voltage0_raw"),
            pump_gpio: PathBuf::from("/sys/class/gpio/gpio5/value"),
            relay_active_low: false,
        }
    }
}

/// Raw sensor thresholds and calibration points. Higher raw value means drier soil.
#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Moisture {
    pub very_dry: u16,
    pub dry: u16,
    pub normal: u16,
    pub ideal: u16,
    pub wet: u16,
    pub too_wet: u16,
    pub air_value: u16,
    pub water_value: u16,
}

impl Default for Moisture {
    fn default() -> Self {
        Self {
            very_dry: 530,
            dry: 430,
            normal: 350,
            ideal: 320,
            wet: 310,
            too_wet: 305,
            air_value: 750,
            water_value: 305,
        }
    }
}

impl Moisture {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            very_dry: self.very_dry,
            dry: self.dry,
            normal: self.normal,
            ideal: self.ideal,
            wet: self.wet,
            too_wet: self.too_wet,
        }
    }

    pub fn calibration(&self) -> Calibration {
        Calibration { air_value: self.air_value, water_value: self.water_value }
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Watering {
    pub min_interval_secs: i64,
    pub auto_duration_secs: u32,
    pub default_duration_secs: u32,
    pub auto_tick_secs: u64,
    /// Pump flow used for the delivered-water estimate.
    pub flow_ml_per_sec: u32,
}

impl Default for Watering {
    fn default() -> Self {
        Self {
            min_interval_secs: 24 * 3600,
            auto_duration_secs: 3,
            default_duration_secs: 3,
            auto_tick_secs: 60,
            flow_ml_per_sec: 50,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_server: WebServer,
    pub hardware: Hardware,
    pub moisture: Moisture,
    pub watering: Watering,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, AppError> {
        if let Some(cfg_str) = &args.cfg_str {
            return Self::load_from_str(cfg_str);
        }
        if !args.cfg_file.exists() {
            warn!(file = %args.cfg_file.display(), "Config file not found. Proceeding with defaults.");
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }
        let config_content = fs::read_to_string(&args.cfg_file)?;
        Self::load_from_str(&config_content)
    }

    pub fn load_from_str(config_str: &str) -> Result<Self, AppError> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.moisture.thresholds().validate()?;
        self.moisture.calibration().validate()?;
        let w = &self.watering;
        if w.min_interval_secs < 0 {
            return Err(AppError::Config("min_interval_secs must not be negative".to_owned()));
        }
        if w.auto_duration_secs == 0 || w.default_duration_secs == 0 {
            return Err(AppError::Config("watering durations must be at least one second".to_owned()));
        }
        if w.auto_tick_secs == 0 {
            return Err(AppError::Config("auto_tick_secs must be at least one second".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use crate::config::{run_options::Args, Config};
    use crate::error::AppError;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.moisture.dry, 430);
        assert_eq!(cfg.moisture.wet, 310);
        assert_eq!(cfg.watering.min_interval_secs, 86_400);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::load_from_str(
            r#"
            [watering]
            auto_tick_secs = 5

            [web_server]
            address = "127.0.0.1:9000"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.watering.auto_tick_secs, 5);
        assert_eq!(cfg.watering.auto_duration_secs, 3);
        assert_eq!(cfg.web_server.address, "127.0.0.1:9000");
        assert_eq!(cfg.moisture.very_dry, 530);
    }

    #[test]
    fn thresholds_out_of_order_are_rejected() {
        let res = Config::load_from_str(
            r#"
            [moisture]
            dry = 300
            "#,
        );
        assert!(matches!(res, Err(AppError::Config(_))));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let res = Config::load_from_str("[watering]\nauto_duration_secs = 0\n");
        assert!(matches!(res, Err(AppError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let res = Config::load_from_str("[watering\n");
        assert!(matches!(res, Err(AppError::ConfigParse(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let args = Args { cfg_file: "/definitely/not/here/sprout.toml".into(), cfg_str: None };
        let cfg = Config::load(&args).unwrap();
        assert_eq!(cfg.web_server.address, "0.0.0.0:8080");
    }
}
