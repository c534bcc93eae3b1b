use super::{ds::MoistureReading, SAMPLE_COUNT, SAMPLE_SPACING_MS};
use crate::{error::AppError, sensors::interface::MoistureProbe, time::TimeProvider};
use std::{sync::Arc, time::Duration};
use tracing::trace;

/// Averages a few spaced probe reads to hide single-sample noise.
/// A stuck or disconnected probe is not detected.
pub struct MoistureSampler {
    probe: Arc<dyn MoistureProbe>,
    time_provider: Arc<dyn TimeProvider>,
}

impl MoistureSampler {
    pub fn new(probe: Arc<dyn MoistureProbe>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { probe, time_provider }
    }

    pub async fn sample(&self) -> Result<MoistureReading, AppError> {
        let mut sum: u32 = 0;
        for i in 0..SAMPLE_COUNT {
            if i > 0 {
                self.time_provider.sleep(Duration::from_millis(SAMPLE_SPACING_MS)).await;
            }
            sum += u32::from(self.probe.read_raw()?);
        }
        let reading = (sum / SAMPLE_COUNT) as MoistureReading;
        trace!(reading, "Moisture sampled.");
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::MoistureSampler;
    use crate::{
        error::AppError,
        test::utils::{mock_hw::MockMoistureProbe, mock_time::MockTimeProvider},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn mean_is_truncated() {
        let mut probe = MockMoistureProbe::new();
        let mut reads = vec![400u16, 401, 401].into_iter();
        probe.expect_read_raw().times(3).returning(move || Ok(reads.next().unwrap()));
        let clock = Arc::new(MockTimeProvider::new(0));
        let sampler = MoistureSampler::new(Arc::new(probe), clock.clone());

        assert_eq!(sampler.sample().await.unwrap(), 400);
        // two 100 ms gaps between three reads
        assert_eq!(clock.now_millis(), 200);
    }

    #[tokio::test]
    async fn probe_error_propagates() {
        let mut probe = MockMoistureProbe::new();
        probe.expect_read_raw().times(1).returning(|| Err(AppError::SensorError("unplugged".to_owned())));
        let sampler = MoistureSampler::new(Arc::new(probe), Arc::new(MockTimeProvider::new(0)));

        assert!(matches!(sampler.sample().await, Err(AppError::SensorError(_))));
    }
}
