use super::{
    actuator::{ActuatorHandle, ActuatorPhase, WateringActuator},
    classifier::{Calibration, MoistureState, Thresholds},
    ds::{Completed, MoistureReading, SchedulerState, StatusReport, TickOutcome, WateringLog},
    gate::{GateDecision, GatePolicy, WateringTrigger},
    sampler::MoistureSampler,
};
use crate::{
    config::Config,
    error::{AppError, Denial},
    sensors::interface::{MoistureProbe, PumpRelay},
    time::TimeProvider,
};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Owns the scheduler state and the pump. Every watering goes through here.
///
/// The actuator mutex is only ever `try_lock`ed: a request arriving while the pump runs is
/// refused with `Busy`, never queued. Sampling, gate evaluation, actuation and the state
/// update run in a spawned task holding that lock, so the sequence finishes (and the relay
/// goes off) even when the caller stops waiting. Status queries don't touch the lock.
pub struct WateringController {
    sampler: Arc<MoistureSampler>,
    thresholds: Thresholds,
    calibration: Calibration,
    policy: GatePolicy,
    auto_duration_secs: u32,
    flow_ml_per_sec: u32,
    actuator: Arc<Mutex<WateringActuator>>,
    actuator_handle: ActuatorHandle,
    state: Arc<Mutex<SchedulerState>>,
    history: Arc<Mutex<WateringLog>>,
    time_provider: Arc<dyn TimeProvider>,
}

impl WateringController {
    pub fn new(
        probe: Arc<dyn MoistureProbe>, relay: Arc<dyn PumpRelay>, time_provider: Arc<dyn TimeProvider>, cfg: &Config,
    ) -> Result<Self, AppError> {
        cfg.validate()?;
        let thresholds = cfg.moisture.thresholds();
        let actuator = WateringActuator::new(relay, time_provider.clone());
        Ok(Self {
            sampler: Arc::new(MoistureSampler::new(probe, time_provider.clone())),
            thresholds,
            calibration: cfg.moisture.calibration(),
            policy: GatePolicy::new(&thresholds, &cfg.watering),
            auto_duration_secs: cfg.watering.auto_duration_secs,
            flow_ml_per_sec: cfg.watering.flow_ml_per_sec,
            actuator_handle: actuator.handle(),
            actuator: Arc::new(Mutex::new(actuator)),
            state: Arc::new(Mutex::new(SchedulerState::new())),
            history: Arc::new(Mutex::new(WateringLog::new())),
            time_provider,
        })
    }

    pub fn now(&self) -> i64 {
        self.time_provider.now()
    }

    pub fn classify(&self, reading: MoistureReading) -> MoistureState {
        self.thresholds.classify(reading)
    }

    pub fn pump_phase(&self) -> ActuatorPhase {
        self.actuator_handle.phase()
    }

    pub async fn scheduler_state(&self) -> SchedulerState {
        *self.state.lock().await
    }

    /// Manual or forced request from the command layer.
    pub async fn trigger_watering(&self, trigger: WateringTrigger) -> Result<Completed, AppError> {
        let now = self.time_provider.now();
        self.gated_watering(trigger, now).await
    }

    pub async fn get_status(&self) -> Result<StatusReport, AppError> {
        let now = self.time_provider.now();
        let reading = self.sampler.sample().await?;
        let state = self.thresholds.classify(reading);
        let sched = *self.state.lock().await;
        let mut history = self.history.lock().await;
        Ok(StatusReport {
            reading,
            moisture_percent: self.calibration.percent(reading),
            state,
            description: state.description(),
            auto_mode: sched.auto_mode,
            last_watering: sched.last_watering,
            secs_since_last: sched.secs_since_last(now),
            waterings_last_24h: history.count(now),
            water_last_24h_ml: history.volume_ml(now, self.flow_ml_per_sec),
            pump: self.pump_phase(),
        })
    }

    pub async fn set_auto_mode(&self, enabled: bool) {
        let mut state = self.state.lock().await;
        if state.auto_mode != enabled {
            info!(enabled, "Auto mode changed.");
        }
        state.auto_mode = enabled;
    }

    pub async fn reset_last_watering(&self) {
        self.state.lock().await.reset_last_watering();
        info!("Last watering time reset.");
    }

    /// Interrupts the running actuation, if any.
    pub fn cancel_watering(&self) -> bool {
        let cancelled = self.actuator_handle.cancel();
        if cancelled {
            info!("Cancel requested for running watering.");
        }
        cancelled
    }

    /// Stops the running actuation and refuses every later watering.
    pub fn shutdown(&self) -> bool {
        let interrupted = self.actuator_handle.halt();
        info!(interrupted, "Watering controller shut down.");
        interrupted
    }

    /// Estimated water for a run of `pumped_secs`.
    pub fn volume_ml(&self, pumped_secs: u32) -> u32 {
        pumped_secs * self.flow_ml_per_sec
    }

    /// One pass of the automatic check. `now` is the tick time used by the gate.
    pub async fn run_auto_tick(&self, now: i64) -> Result<TickOutcome, AppError> {
        if !self.state.lock().await.auto_mode {
            return Ok(TickOutcome::AutoDisabled);
        }
        let trigger = WateringTrigger::Auto { duration_secs: self.auto_duration_secs };
        match self.gated_watering(trigger, now).await {
            Ok(done) => Ok(TickOutcome::Watered(done)),
            Err(AppError::Denied(denial)) => Ok(TickOutcome::Denied(denial)),
            Err(e) => Err(e),
        }
    }

    async fn gated_watering(&self, trigger: WateringTrigger, now: i64) -> Result<Completed, AppError> {
        if self.actuator_handle.is_halted() {
            return Err(AppError::ShuttingDown);
        }
        let Ok(actuator) = self.actuator.clone().try_lock_owned() else {
            debug!(%trigger, "Pump busy, request rejected.");
            return Err(Denial::Busy.into());
        };

        let run = WateringRun {
            sampler: self.sampler.clone(),
            thresholds: self.thresholds,
            policy: self.policy,
            state: self.state.clone(),
            history: self.history.clone(),
            halt: self.actuator_handle.clone(),
        };
        tokio::spawn(run.execute(trigger, now, actuator)).await?
    }
}

/// One gated watering, detached from the request that asked for it.
struct WateringRun {
    sampler: Arc<MoistureSampler>,
    thresholds: Thresholds,
    policy: GatePolicy,
    state: Arc<Mutex<SchedulerState>>,
    history: Arc<Mutex<WateringLog>>,
    halt: ActuatorHandle,
}

impl WateringRun {
    async fn execute(
        self, trigger: WateringTrigger, now: i64, mut actuator: OwnedMutexGuard<WateringActuator>,
    ) -> Result<Completed, AppError> {
        let reading = self.sampler.sample().await?;
        let sched = *self.state.lock().await;
        let decision = self.policy.evaluate(&trigger, reading, now, &sched);
        debug!(%trigger, reading, state = %self.thresholds.classify(reading), ?decision, "Gate evaluated.");
        if let GateDecision::Deny(denial) = decision {
            return Err(denial.into());
        }
        if self.halt.is_halted() {
            warn!(%trigger, "Shutdown requested while sampling, watering skipped.");
            return Err(AppError::ShuttingDown);
        }

        info!(%trigger, reading, duration_secs = trigger.duration_secs(), "Starting watering.");
        let done = actuator.actuate(&trigger.profile(), trigger.duration_secs()).await;
        self.state.lock().await.record_watering(done.timestamp);
        self.history.lock().await.record(&done);
        Ok(done)
    }
}
