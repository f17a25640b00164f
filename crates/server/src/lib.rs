//! HTTP API server for fablearr.

pub mod api;
pub mod metrics;
pub mod state;
