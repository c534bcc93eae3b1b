pub mod mock_cfg;
pub mod mock_hw;
pub mod mock_time;

use crate::watering::{controller::WateringController, ds::AppState};
use mock_cfg::mock_cfg;
use mock_hw::{counting_relay, set_failing_probe, set_probe, RelayCounters};
use mock_time::MockTimeProvider;
use std::sync::{atomic::AtomicU16, Arc};

/// Controller wired to mock hardware and a virtual clock.
pub struct TestRig {
    pub controller: Arc<WateringController>,
    pub reading: Arc<AtomicU16>,
    pub relay: Arc<RelayCounters>,
    pub time_provider: Arc<MockTimeProvider>,
}

impl TestRig {
    pub fn app_state(&self) -> Arc<AppState> {
        AppState::new(self.controller.clone(), mock_cfg().watering)
    }
}

pub fn set_rig(start_time: i64, reading: u16) -> TestRig {
    let reading = Arc::new(AtomicU16::new(reading));
    let (relay, counters) = counting_relay();
    let time_provider = Arc::new(MockTimeProvider::new(start_time));
    let controller =
        WateringController::new(set_probe(reading.clone()), relay, time_provider.clone(), &mock_cfg()).expect("controller from test config");
    TestRig { controller: Arc::new(controller), reading, relay: counters, time_provider }
}

pub fn set_rig_with_failing_probe(start_time: i64) -> TestRig {
    let (relay, counters) = counting_relay();
    let time_provider = Arc::new(MockTimeProvider::new(start_time));
    let controller = WateringController::new(set_failing_probe(), relay, time_provider.clone(), &mock_cfg()).expect("controller from test config");
    TestRig { controller: Arc::new(controller), reading: Arc::new(AtomicU16::new(0)), relay: counters, time_provider }
}
