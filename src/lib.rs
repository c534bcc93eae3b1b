pub mod api;
pub mod config;
pub mod error;
pub mod sensors;
pub mod test;
pub mod time;
pub mod utils;
pub mod watering;
