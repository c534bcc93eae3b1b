use crate::time::TimeProvider;
use async_trait::async_trait;
use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};
use tokio::sync::watch;

/// Sleeps at least this long can be held back with `hold_long_sleeps`.
pub const LONG_SLEEP: Duration = Duration::from_secs(1);

/// Virtual clock. `sleep` advances it instantly and yields once so other tasks get a turn.
pub struct MockTimeProvider {
    current_millis: AtomicI64,
    hold: watch::Sender<bool>,
}

impl MockTimeProvider {
    pub fn new(start_secs: i64) -> Self {
        let (hold, _) = watch::channel(false);
        Self { current_millis: AtomicI64::new(start_secs * 1000), hold }
    }

    pub fn advance_time(&self, seconds: i64) {
        self.current_millis.fetch_add(seconds * 1000, Ordering::SeqCst);
    }

    pub fn set(&self, new_time: i64) {
        self.current_millis.store(new_time * 1000, Ordering::SeqCst)
    }

    pub fn now_millis(&self) -> i64 {
        self.current_millis.load(Ordering::SeqCst)
    }

    /// While held, sleeps of `LONG_SLEEP` or more park until released. Short sleeps
    /// (sampling gaps, priming pulses) keep running, so a pump run can be frozen mid-way.
    pub fn hold_long_sleeps(&self, hold: bool) {
        self.hold.send_replace(hold);
    }
}

#[async_trait]
impl TimeProvider for MockTimeProvider {
    fn now(&self) -> i64 {
        self.now_millis().div_euclid(1000)
    }

    async fn sleep(&self, duration: Duration) {
        if duration >= LONG_SLEEP {
            let mut hold_rx = self.hold.subscribe();
            let _released = hold_rx.wait_for(|held| !*held).await.is_ok();
        }
        self.current_millis.fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}
