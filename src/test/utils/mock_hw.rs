use crate::error::AppError;
use crate::sensors::interface::{MoistureProbe, PumpRelay};
use mockall::mock;
use std::sync::{
    atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering},
    Arc,
};
use tracing::trace;

mock! {
    pub MoistureProbe {}

    impl MoistureProbe for MoistureProbe {
        fn read_raw(&self) -> Result<u16, AppError>;
    }
}

mock! {
    pub PumpRelay {}

    impl PumpRelay for PumpRelay {
        fn switch_on(&self) -> Result<(), AppError>;
        fn switch_off(&self) -> Result<(), AppError>;
    }
}

/// Probe whose reading the test can change at any time.
pub fn set_probe(reading: Arc<AtomicU16>) -> Arc<MockMoistureProbe> {
    let mut probe = MockMoistureProbe::new();
    probe.expect_read_raw().times(0..).returning(move || {
        let raw = reading.load(Ordering::SeqCst);
        trace!("Mocked probe read {}", raw);
        Ok(raw)
    });
    Arc::new(probe)
}

pub fn set_failing_probe() -> Arc<MockMoistureProbe> {
    let mut probe = MockMoistureProbe::new();
    probe.expect_read_raw().times(0..).returning(|| Err(AppError::SensorError("probe disconnected".to_owned())));
    Arc::new(probe)
}

#[derive(Debug, Default)]
pub struct RelayCounters {
    pub on: AtomicUsize,
    pub off: AtomicUsize,
    energized: AtomicBool,
}

impl RelayCounters {
    pub fn is_on(&self) -> bool {
        self.energized.load(Ordering::SeqCst)
    }

    /// Every watering switches the relay on once per priming pulse plus once for the run.
    pub fn waterings(&self, pulses_per_run: usize) -> usize {
        self.on.load(Ordering::SeqCst) / (pulses_per_run + 1)
    }
}

pub fn counting_relay() -> (Arc<MockPumpRelay>, Arc<RelayCounters>) {
    let counters = Arc::new(RelayCounters::default());
    let mut relay = MockPumpRelay::new();
    let c = counters.clone();
    relay.expect_switch_on().times(0..).returning(move || {
        trace!("Mocked relay on");
        c.on.fetch_add(1, Ordering::SeqCst);
        c.energized.store(true, Ordering::SeqCst);
        Ok(())
    });
    let c = counters.clone();
    relay.expect_switch_off().times(0..).returning(move || {
        trace!("Mocked relay off");
        c.off.fetch_add(1, Ordering::SeqCst);
        c.energized.store(false, Ordering::SeqCst);
        Ok(())
    });
    (Arc::new(relay), counters)
}
