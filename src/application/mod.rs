pub mod config;
pub mod database;
pub mod error;
pub mod state;
pub mod telemetry;
