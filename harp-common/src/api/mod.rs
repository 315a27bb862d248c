//! API module for shared HTTP API types
//!
//! Contains ONLY framework-independent request/response types; the
//! service crate wraps them with Axum handlers.

pub mod types;

pub use types::{
    HealthResponse, PredictionRecord, PredictionResponse, ResponseStatus, ServiceInfo,
};
