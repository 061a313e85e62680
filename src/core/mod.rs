pub mod config;
pub mod metrics;
pub(crate) mod telemetry;
pub(crate) mod time;
