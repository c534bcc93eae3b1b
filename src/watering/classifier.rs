//! Maps a raw moisture reading to one of seven wetness states.
//!
//! The probe reports higher values for drier soil. Thresholds are absolute raw values,
//! not a percentage; the calibration points only feed the informational percentage.

use super::ds::MoistureReading;
use crate::error::AppError;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::Serialize;
use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(usize)]
pub enum MoistureState {
    VeryDry = 0,
    Dry = 1,
    Normal = 2,
    Ideal = 3,
    Wet = 4,
    TooWet = 5,
    Overwatered = 6,
}

impl MoistureState {
    pub const ALL: [MoistureState; 7] = [
        MoistureState::VeryDry,
        MoistureState::Dry,
        MoistureState::Normal,
        MoistureState::Ideal,
        MoistureState::Wet,
        MoistureState::TooWet,
        MoistureState::Overwatered,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            MoistureState::VeryDry => "Urgent watering required",
            MoistureState::Dry => "Watering recommended",
            MoistureState::Normal => "Moisture is normal",
            MoistureState::Ideal => "Optimal moisture",
            MoistureState::Wet => "No watering needed",
            MoistureState::TooWet => "Dangerous for the plant",
            MoistureState::Overwatered => "Possible root rot",
        }
    }
}

impl Display for MoistureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            MoistureState::VeryDry => "VERY_DRY",
            MoistureState::Dry => "DRY",
            MoistureState::Normal => "NORMAL",
            MoistureState::Ideal => "IDEAL",
            MoistureState::Wet => "WET",
            MoistureState::TooWet => "TOO_WET",
            MoistureState::Overwatered => "OVERWATERED",
        };
        f.write_str(state)
    }
}

/// Lower bounds of the six driest states, strictly decreasing.
/// Anything below `too_wet` is overwatered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    pub very_dry: MoistureReading,
    pub dry: MoistureReading,
    pub normal: MoistureReading,
    pub ideal: MoistureReading,
    pub wet: MoistureReading,
    pub too_wet: MoistureReading,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { very_dry: 530, dry: 430, normal: 350, ideal: 320, wet: 310, too_wet: 305 }
    }
}

impl Thresholds {
    pub fn as_array(&self) -> [MoistureReading; 6] {
        [self.very_dry, self.dry, self.normal, self.ideal, self.wet, self.too_wet]
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let bounds = self.as_array();
        if bounds.windows(2).all(|pair| pair[0] > pair[1]) {
            Ok(())
        } else {
            Err(AppError::Config(format!("moisture thresholds must be strictly decreasing: {:?}", bounds)))
        }
    }

    pub fn classify(&self, reading: MoistureReading) -> MoistureState {
        self.as_array()
            .iter()
            .position(|bound| reading >= *bound)
            .and_then(MoistureState::from_usize)
            .unwrap_or(MoistureState::Overwatered)
    }

    /// Half-open raw interval `[low, high)` producing `state`. `None` means unbounded.
    pub fn interval(&self, state: MoistureState) -> (Option<MoistureReading>, Option<MoistureReading>) {
        let bounds = self.as_array();
        let idx = state as usize;
        let low = bounds.get(idx).copied();
        let high = idx.checked_sub(1).and_then(|i| bounds.get(i).copied());
        (low, high)
    }
}

/// Dry-air and saturated-soil reference readings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibration {
    pub air_value: MoistureReading,
    pub water_value: MoistureReading,
}

impl Default for Calibration {
    fn default() -> Self {
        Self { air_value: 750, water_value: 305 }
    }
}

impl Calibration {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.air_value > self.water_value {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "air_value ({}) must be greater than water_value ({})",
                self.air_value, self.water_value
            )))
        }
    }

    /// 0 in dry air, 100 in saturated soil.
    pub fn percent(&self, reading: MoistureReading) -> u8 {
        let span = i32::from(self.air_value) - i32::from(self.water_value);
        if span <= 0 {
            return 0;
        }
        let pct = (i32::from(self.air_value) - i32::from(reading)) * 100 / span;
        pct.clamp(0, 100) as u8
    }
}
