pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod store;
pub mod telemetry;
