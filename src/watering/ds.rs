use super::{actuator::ActuatorPhase, classifier::MoistureState, controller::WateringController};
use crate::{config::Watering, error::Denial, utils::serialize_ts_or_never};
use serde::Serialize;
use std::{collections::VecDeque, sync::Arc};

/// Raw averaged ADC value of the soil probe.
pub type MoistureReading = u16;

/// Mode flag and last watering time. Lives only as long as the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerState {
    pub last_watering: Option<i64>,
    pub auto_mode: bool,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never moves the timestamp backwards; only `reset_last_watering` clears it.
    pub fn record_watering(&mut self, at: i64) {
        self.last_watering = Some(self.last_watering.map_or(at, |prev| prev.max(at)));
    }

    pub fn reset_last_watering(&mut self) {
        self.last_watering = None;
    }

    pub fn secs_since_last(&self, now: i64) -> Option<i64> {
        self.last_watering.map(|last| (now - last).max(0))
    }
}

/// Rolling record of the waterings in the last `WINDOW_SECS`. In memory only.
#[derive(Debug, Clone, Default)]
pub struct WateringLog {
    runs: VecDeque<(i64, u32)>,
}

impl WateringLog {
    pub const WINDOW_SECS: i64 = 24 * 3600;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, done: &Completed) {
        self.runs.push_back((done.timestamp, done.pumped_secs));
    }

    fn prune(&mut self, now: i64) {
        while self.runs.front().is_some_and(|(at, _)| now - at >= Self::WINDOW_SECS) {
            self.runs.pop_front();
        }
    }

    pub fn count(&mut self, now: i64) -> usize {
        self.prune(now);
        self.runs.len()
    }

    /// Estimated water delivered inside the window.
    pub fn volume_ml(&mut self, now: i64, flow_ml_per_sec: u32) -> u32 {
        self.prune(now);
        self.runs.iter().map(|(_, secs)| secs * flow_ml_per_sec).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completed {
    pub timestamp: i64,
    pub duration_secs: u32,
    /// Seconds the relay was held on after priming. Below `duration_secs` only when cancelled.
    pub pumped_secs: u32,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    AutoDisabled,
    Denied(Denial),
    Watered(Completed),
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub reading: MoistureReading,
    pub moisture_percent: u8,
    pub state: MoistureState,
    pub description: &'static str,
    pub auto_mode: bool,
    #[serde(serialize_with = "serialize_ts_or_never")]
    pub last_watering: Option<i64>,
    pub secs_since_last: Option<i64>,
    pub waterings_last_24h: usize,
    pub water_last_24h_ml: u32,
    pub pump: ActuatorPhase,
}

pub struct AppState {
    pub controller: Arc<WateringController>,
    pub cfg: Watering,
}

impl AppState {
    pub fn new(controller: Arc<WateringController>, cfg: Watering) -> Arc<Self> {
        Arc::new(Self { controller, cfg })
    }
}
