//! Linux sysfs adapters: an IIO ADC channel for the probe and a GPIO value file for the relay.

use super::interface::{MoistureProbe, PumpRelay};
use crate::error::AppError;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct SysfsMoistureProbe {
    path: PathBuf,
}

impl SysfsMoistureProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MoistureProbe for SysfsMoistureProbe {
    fn read_raw(&self) -> Result<u16, AppError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::SensorError(format!("Failed to read {}: {}", self.path.display(), e)))?;
        let raw = parse_raw(&content)
            .ok_or_else(|| AppError::SensorError(format!("Unexpected ADC value {:?} in {}", content.trim(), self.path.display())))?;
        trace!(raw, "Probe read.");
        Ok(raw)
    }
}

fn parse_raw(content: &str) -> Option<u16> {
    content.trim().parse::<u16>().ok()
}

#[derive(Debug, Clone)]
pub struct SysfsPumpRelay {
    path: PathBuf,
    active_low: bool,
}

impl SysfsPumpRelay {
    pub fn new(path: impl Into<PathBuf>, active_low: bool) -> Self {
        Self { path: path.into(), active_low }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_level(&self, on: bool) -> Result<(), AppError> {
        let level = if on != self.active_low { "1" } else { "0" };
        fs::write(&self.path, level)
            .map_err(|e| AppError::RelayError(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl PumpRelay for SysfsPumpRelay {
    fn switch_on(&self) -> Result<(), AppError> {
        self.write_level(true)
    }

    fn switch_off(&self) -> Result<(), AppError> {
        self.write_level(false)
    }
}
