use crate::{
    error::{AppError, Denial},
    watering::{
        ds::{AppState, Completed, StatusReport},
        gate::WateringTrigger,
    },
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug)]
pub enum ApiError {
    MissingParameter(&'static str),
    InvalidParameter(&'static str),
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError::App(e)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
    pub reason: Option<Denial>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, reason) = match self {
            ApiError::MissingParameter(name) => {
                (StatusCode::BAD_REQUEST, format!("Missing parameter: {}", name), None)
            }
            ApiError::InvalidParameter(name) => {
                (StatusCode::BAD_REQUEST, format!("Invalid parameter: {}", name), None)
            }
            ApiError::App(AppError::Denied(denial)) => {
                let status = match denial {
                    Denial::TooWet | Denial::NotDryEnough => StatusCode::FORBIDDEN,
                    Denial::IntervalNotElapsed => StatusCode::TOO_MANY_REQUESTS,
                    Denial::Busy => StatusCode::CONFLICT,
                };
                (status, denial.to_string(), Some(denial))
            }
            ApiError::App(AppError::ShuttingDown) => {
                (StatusCode::SERVICE_UNAVAILABLE, AppError::ShuttingDown.to_string(), None)
            }
            ApiError::App(e) => {
                error!(error = %e, "Request failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None)
            }
        };
        (status, Json(ErrorResponse { error, reason })).into_response()
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct DurationParams {
    pub duration: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AutoParams {
    pub enable: Option<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WateringResponse {
    pub message: String,
    pub timestamp: i64,
    pub duration_secs: u32,
    pub pumped_secs: u32,
    pub estimated_volume_ml: u32,
    pub cancelled: bool,
}

impl WateringResponse {
    fn new(done: Completed, app_state: &AppState) -> Json<Self> {
        let message = if done.cancelled { "Watering cancelled" } else { "Watering completed" };
        Json(Self {
            message: message.to_owned(),
            timestamp: done.timestamp,
            duration_secs: done.duration_secs,
            pumped_secs: done.pumped_secs,
            estimated_volume_ml: app_state.controller.volume_ml(done.pumped_secs),
            cancelled: done.cancelled,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self { message: message.to_owned() })
    }
}

fn valid_duration(duration: u32) -> Result<u32, ApiError> {
    if duration == 0 {
        return Err(ApiError::InvalidParameter("duration"));
    }
    Ok(duration)
}

pub async fn get_status(State(app_state): State<Arc<AppState>>) -> Result<Json<StatusReport>, ApiError> {
    Ok(Json(app_state.controller.get_status().await?))
}

pub async fn water(
    State(app_state): State<Arc<AppState>>, Query(params): Query<DurationParams>,
) -> Result<Json<WateringResponse>, ApiError> {
    let duration = params.duration.ok_or(ApiError::MissingParameter("duration"))?;
    let trigger = WateringTrigger::Manual { duration_secs: valid_duration(duration)? };
    let done = app_state.controller.trigger_watering(trigger).await?;
    Ok(WateringResponse::new(done, &app_state))
}

pub async fn force_water(
    State(app_state): State<Arc<AppState>>, Query(params): Query<DurationParams>,
) -> Result<Json<WateringResponse>, ApiError> {
    let duration = valid_duration(params.duration.unwrap_or(app_state.cfg.default_duration_secs))?;
    let done = app_state.controller.trigger_watering(WateringTrigger::Forced { duration_secs: duration }).await?;
    Ok(WateringResponse::new(done, &app_state))
}

pub async fn reset(State(app_state): State<Arc<AppState>>) -> Json<MessageResponse> {
    app_state.controller.reset_last_watering().await;
    MessageResponse::new("Last watering time reset")
}

pub async fn set_auto(
    State(app_state): State<Arc<AppState>>, Query(params): Query<AutoParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let enabled = match params.enable {
        Some(0) => false,
        Some(1) => true,
        Some(_) => return Err(ApiError::InvalidParameter("enable")),
        None => return Err(ApiError::MissingParameter("enable")),
    };
    app_state.controller.set_auto_mode(enabled).await;
    Ok(MessageResponse::new(if enabled { "Auto mode enabled" } else { "Auto mode disabled" }))
}

pub async fn cancel(State(app_state): State<Arc<AppState>>) -> Json<MessageResponse> {
    if app_state.controller.cancel_watering() {
        MessageResponse::new("Watering cancel requested")
    } else {
        MessageResponse::new("No watering in progress")
    }
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/water", get(water))
        .route("/force_water", get(force_water))
        .route("/reset", get(reset))
        .route("/auto", get(set_auto))
        .route("/cancel", post(cancel))
        .with_state(app_state)
}

pub async fn run_web_server(
    app_state: Arc<AppState>, addr: SocketAddr, mut shutdown: watch::Receiver<bool>,
) -> Result<(), AppError> {
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(5)));
    });

    info!("Starting HTTP server on http://{}", addr);
    axum_server::bind(addr).handle(handle).serve(router(app_state).into_make_service()).await?;
    Ok(())
}
