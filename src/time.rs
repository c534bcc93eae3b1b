use async_trait::async_trait;
use std::time::{Duration, Instant};

#[async_trait]
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> i64; // Monotonic whole seconds since process start
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug)]
pub struct RealTimeProvider {
    started: Instant,
}

impl RealTimeProvider {
    pub fn new() -> Self {
        Self { started: Instant::now() }
    }
}

impl Default for RealTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimeProvider for RealTimeProvider {
    fn now(&self) -> i64 {
        self.started.elapsed().as_secs() as i64
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
