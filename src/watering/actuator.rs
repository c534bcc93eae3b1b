//! Pump actuation: a few priming pulses to push water through the line, a settle pause,
//! then the relay held on for the requested whole seconds.
//!
//! `Idle -> Priming -> Sustained -> Idle`
//!
//! Every wait can be interrupted through [`ActuatorHandle::cancel`] or [`ActuatorHandle::halt`]; the relay is then
//! switched off and the run completes early with `cancelled` set. Exclusive use of the
//! relay is the caller's job (the controller keeps the actuator behind a mutex).

use super::ds::Completed;
use crate::{sensors::interface::PumpRelay, time::TimeProvider};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimingProfile {
    pub pulses: u32,
    pub on: Duration,
    pub off: Duration,
    pub settle: Duration,
}

impl PrimingProfile {
    pub const STANDARD: PrimingProfile = PrimingProfile {
        pulses: 2,
        on: Duration::from_millis(100),
        off: Duration::from_millis(150),
        settle: Duration::from_millis(300),
    };

    pub const FORCED: PrimingProfile = PrimingProfile {
        pulses: 3,
        on: Duration::from_millis(150),
        off: Duration::from_millis(200),
        settle: Duration::from_millis(500),
    };

    pub fn priming_time(&self) -> Duration {
        (self.on + self.off) * self.pulses + self.settle
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorPhase {
    #[default]
    Idle,
    Priming,
    Sustained,
}

/// Read-only view of the actuator plus its cancel and halt switches. Usable while an actuation runs.
#[derive(Clone)]
pub struct ActuatorHandle {
    phase: watch::Receiver<ActuatorPhase>,
    cancel: Arc<watch::Sender<bool>>,
    halt: Arc<watch::Sender<bool>>,
}

impl ActuatorHandle {
    pub fn phase(&self) -> ActuatorPhase {
        *self.phase.borrow()
    }

    /// Returns false when nothing is running.
    pub fn cancel(&self) -> bool {
        if self.phase() == ActuatorPhase::Idle {
            return false;
        }
        self.cancel.send_replace(true);
        true
    }

    /// Permanent stop: interrupts the current run and every later one. Returns true if a run was active.
    pub fn halt(&self) -> bool {
        self.halt.send_replace(true);
        self.phase() != ActuatorPhase::Idle
    }

    pub fn is_halted(&self) -> bool {
        *self.halt.borrow()
    }
}

/// Switches the relay off and reports `Idle` if an actuation is dropped half way.
struct RunGuard<'a> {
    actuator: &'a WateringActuator,
    armed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Actuation dropped while running, forcing pump off.");
            self.actuator.relay_off();
            self.actuator.phase.send_replace(ActuatorPhase::Idle);
        }
    }
}

pub struct WateringActuator {
    relay: Arc<dyn PumpRelay>,
    time_provider: Arc<dyn TimeProvider>,
    phase: watch::Sender<ActuatorPhase>,
    cancel: Arc<watch::Sender<bool>>,
    halt: Arc<watch::Sender<bool>>,
}

impl WateringActuator {
    pub fn new(relay: Arc<dyn PumpRelay>, time_provider: Arc<dyn TimeProvider>) -> Self {
        let (phase, _) = watch::channel(ActuatorPhase::Idle);
        let (cancel, _) = watch::channel(false);
        let (halt, _) = watch::channel(false);
        Self { relay, time_provider, phase, cancel: Arc::new(cancel), halt: Arc::new(halt) }
    }

    pub fn handle(&self) -> ActuatorHandle {
        ActuatorHandle { phase: self.phase.subscribe(), cancel: self.cancel.clone(), halt: self.halt.clone() }
    }

    /// Blocks the calling task for the whole priming plus `duration_secs`.
    pub async fn actuate(&mut self, profile: &PrimingProfile, duration_secs: u32) -> Completed {
        self.cancel.send_replace(false);
        let mut stop = StopSignals { cancel: self.cancel.subscribe(), halt: self.halt.subscribe() };
        let mut guard = RunGuard { actuator: self, armed: true };
        let this = guard.actuator;

        this.phase.send_replace(ActuatorPhase::Priming);
        trace!(pulses = profile.pulses, "Priming pump.");
        let mut finished = this.prime(profile, &mut stop).await;

        let mut pumped_secs = 0;
        if finished {
            this.phase.send_replace(ActuatorPhase::Sustained);
            info!(duration_secs, "Pump running.");
            let started = this.time_provider.now();
            this.relay_on();
            finished = this.wait(Duration::from_secs(u64::from(duration_secs)), &mut stop).await;
            this.relay_off();
            pumped_secs = if finished {
                duration_secs
            } else {
                (this.time_provider.now() - started).clamp(0, i64::from(duration_secs)) as u32
            };
        }

        let timestamp = this.time_provider.now();
        this.phase.send_replace(ActuatorPhase::Idle);
        guard.armed = false;
        if finished {
            info!(duration_secs, timestamp, "Watering completed.");
        } else {
            warn!(duration_secs, pumped_secs, timestamp, "Watering cancelled.");
        }
        Completed { timestamp, duration_secs, pumped_secs, cancelled: !finished }
    }

    async fn prime(&self, profile: &PrimingProfile, stop: &mut StopSignals) -> bool {
        for pulse in 0..profile.pulses {
            trace!(pulse, "Priming pulse.");
            self.relay_on();
            let finished = self.wait(profile.on, stop).await;
            self.relay_off();
            if !finished || !self.wait(profile.off, stop).await {
                return false;
            }
        }
        self.wait(profile.settle, stop).await
    }

    /// False when interrupted by a cancel or halt request.
    async fn wait(&self, duration: Duration, stop: &mut StopSignals) -> bool {
        tokio::select! {
            biased;
            _ = stop.cancel.wait_for(|cancelled| *cancelled) => false,
            _ = stop.halt.wait_for(|halted| *halted) => false,
            _ = self.time_provider.sleep(duration) => true,
        }
    }

    fn relay_on(&self) {
        if let Err(e) = self.relay.switch_on() {
            error!(error = %e, "Failed to switch pump relay on.");
        }
    }

    fn relay_off(&self) {
        if let Err(e) = self.relay.switch_off() {
            error!(error = %e, "Failed to switch pump relay off.");
        }
    }
}

struct StopSignals {
    cancel: watch::Receiver<bool>,
    halt: watch::Receiver<bool>,
}
