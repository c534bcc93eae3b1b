use super::{controller::WateringController, ds::TickOutcome};
use crate::{error::AppError, time::TimeProvider};
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Periodic auto-watering driver. Runs until the stop signal fires or, in simulations,
/// until the clock reaches `end_time`. A tick that waters holds the loop for the whole run.
pub async fn run_watering_system(
    controller: Arc<WateringController>,
    time_provider: Arc<dyn TimeProvider>,
    mut stop_signal: watch::Receiver<bool>,
    tick: Duration,
    end_time: Option<i64>, // Optional parameter for simulation
) -> Result<(), AppError> {
    info!(tick_secs = tick.as_secs(), "Starting watering system.");
    let mut now = time_provider.now();
    while end_time.map_or(true, |end| now < end) && !*stop_signal.borrow() {
        match controller.run_auto_tick(now).await {
            Ok(TickOutcome::Watered(done)) => info!(timestamp = done.timestamp, "Auto watering done."),
            Ok(TickOutcome::Denied(denial)) => debug!(%denial, "Auto watering skipped."),
            Ok(TickOutcome::AutoDisabled) => {}
            Err(e) => error!(error = %e, "Auto tick failed."),
        }

        tokio::select! {
            _ = time_provider.sleep(tick) => {}
            res = stop_signal.changed() => {
                if res.is_err() {
                    break;
                }
            }
        }
        now = time_provider.now();
    }
    info!("Ending watering system.");
    Ok(())
}
