//! Watering permission policy.
//!
//! Manual requests get a flood guard (refused when the soil is already wet) and a rate limit.
//! Automatic requests need the soil to be drier than the dry threshold and a strictly longer gap
//! than the minimum interval. Forced requests skip every check.

use super::{
    actuator::PrimingProfile,
    classifier::Thresholds,
    ds::{MoistureReading, SchedulerState},
};
use crate::{config::Watering, error::Denial};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WateringTrigger {
    Manual { duration_secs: u32 },
    Forced { duration_secs: u32 },
    Auto { duration_secs: u32 },
}

impl WateringTrigger {
    pub fn duration_secs(&self) -> u32 {
        match *self {
            WateringTrigger::Manual { duration_secs }
            | WateringTrigger::Forced { duration_secs }
            | WateringTrigger::Auto { duration_secs } => duration_secs,
        }
    }

    /// Only forced requests prime harder; automatic waterings always use the standard profile.
    pub fn profile(&self) -> PrimingProfile {
        match self {
            WateringTrigger::Forced { .. } => PrimingProfile::FORCED,
            WateringTrigger::Manual { .. } | WateringTrigger::Auto { .. } => PrimingProfile::STANDARD,
        }
    }
}

impl Display for WateringTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            WateringTrigger::Manual { .. } => "manual",
            WateringTrigger::Forced { .. } => "forced",
            WateringTrigger::Auto { .. } => "auto",
        };
        f.write_str(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny(Denial),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        *self == GateDecision::Allow
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            GateDecision::Allow => Ok(()),
            GateDecision::Deny(denial) => Err(denial),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePolicy {
    /// Auto watering needs a reading strictly above this.
    pub dry_threshold: MoistureReading,
    /// Manual watering is refused below this.
    pub wet_threshold: MoistureReading,
    pub min_interval_secs: i64,
}

impl GatePolicy {
    pub fn new(thresholds: &Thresholds, cfg: &Watering) -> Self {
        Self { dry_threshold: thresholds.dry, wet_threshold: thresholds.wet, min_interval_secs: cfg.min_interval_secs }
    }

    pub fn evaluate(
        &self, trigger: &WateringTrigger, reading: MoistureReading, now: i64, state: &SchedulerState,
    ) -> GateDecision {
        let elapsed = state.last_watering.map(|last| now - last);
        match trigger {
            WateringTrigger::Forced { .. } => GateDecision::Allow,
            WateringTrigger::Manual { .. } => {
                if reading < self.wet_threshold {
                    GateDecision::Deny(Denial::TooWet)
                } else if elapsed.is_some_and(|secs| secs < self.min_interval_secs) {
                    GateDecision::Deny(Denial::IntervalNotElapsed)
                } else {
                    GateDecision::Allow
                }
            }
            WateringTrigger::Auto { .. } => {
                if reading <= self.dry_threshold {
                    GateDecision::Deny(Denial::NotDryEnough)
                } else if elapsed.is_some_and(|secs| secs <= self.min_interval_secs) {
                    GateDecision::Deny(Denial::IntervalNotElapsed)
                } else {
                    GateDecision::Allow
                }
            }
        }
    }
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::new(&Thresholds::default(), &Watering::default())
    }
}
