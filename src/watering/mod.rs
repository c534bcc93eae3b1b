pub mod actuator;
pub mod classifier;
pub mod controller;
pub mod ds;
pub mod gate;
pub mod sampler;
pub mod watering_system;

pub const SAMPLE_COUNT: u32 = 3;
pub const SAMPLE_SPACING_MS: u64 = 100;
