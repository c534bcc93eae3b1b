use sprout::api::run_web_server;
use sprout::config::{run_options::get_args, Config};
use sprout::sensors::interface::PumpRelay;
use sprout::sensors::sysfs::{SysfsMoistureProbe, SysfsPumpRelay};
use sprout::time::{RealTimeProvider, TimeProvider};
use sprout::utils::start_log;
use sprout::watering::controller::WateringController;
use sprout::watering::ds::AppState;
use sprout::watering::watering_system::run_watering_system;
use std::{error::Error, net::SocketAddr, sync::Arc, time::Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    start_log(None);

    info!("Starting application...");
    let args = get_args();
    let cfg = Config::load(&args)?;
    let addr: SocketAddr = cfg.web_server.address.parse()?;

    let time_provider: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider::new());
    let probe = Arc::new(SysfsMoistureProbe::new(&cfg.hardware.moisture_adc));
    let relay = Arc::new(SysfsPumpRelay::new(&cfg.hardware.pump_gpio, cfg.hardware.relay_active_low));
    info!(adc = %cfg.hardware.moisture_adc.display(), relay = %relay.path().display(), "Hardware configured.");
    // never start with the pump energised
    if let Err(e) = relay.switch_off() {
        warn!(error = %e, "Could not force pump relay off at startup.");
    }

    let controller = Arc::new(WateringController::new(probe, relay.clone(), time_provider.clone(), &cfg)?);
    let app_state = AppState::new(controller.clone(), cfg.watering);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let ws_controller = controller.clone();
    let ws_shutdown = shutdown_rx.clone();
    let tick = Duration::from_secs(cfg.watering.auto_tick_secs);
    let watering_task = tokio::spawn(async move {
        run_watering_system(ws_controller, time_provider, ws_shutdown, tick, None).await
    });

    let server_task = tokio::spawn(async move {
        if let Err(e) = run_web_server(app_state, addr, shutdown_rx).await {
            error!(error = %e, "Web server error.");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested.");
    controller.shutdown();
    _ = shutdown_tx.send(true);

    if let Ok(Err(e)) = watering_task.await {
        error!(error = %e, "Watering system ended with error.");
    }
    _ = server_task.await;
    if let Err(e) = relay.switch_off() {
        error!(error = %e, "Could not switch pump relay off on exit.");
    }
    info!("Bye.");
    Ok(())
}
