use crate::error::AppError;

/// Single raw read of the soil moisture probe.
pub trait MoistureProbe: Send + Sync {
    fn read_raw(&self) -> Result<u16, AppError>;
}

/// Pump relay. Implementations only switch the line; timing belongs to the actuator.
pub trait PumpRelay: Send + Sync {
    fn switch_on(&self) -> Result<(), AppError>;
    fn switch_off(&self) -> Result<(), AppError>;
}
