//! Two-tier user directory: a record service that owns user records and a
//! public gateway that fronts it over HTTP.

pub mod app;
pub mod config;
pub mod db;
pub mod gateway;
pub mod state;
pub mod telemetry;
pub mod users;
