pub mod accounts;
pub mod config;
pub mod discovery;
pub mod error;
pub mod telemetry;
