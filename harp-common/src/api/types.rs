//! Shared API request/response types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ========================================
// Prediction Types
// ========================================

/// Outcome of a prediction request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// One output row: the input identifier and its human-readable label
///
/// # Examples
///
/// ```
/// use harp_common::api::types::PredictionRecord;
///
/// let record = PredictionRecord::new(42, "high risk");
/// assert_eq!(record.id, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub prediction: String,
}

impl PredictionRecord {
    pub fn new(id: i64, prediction: impl Into<String>) -> Self {
        Self {
            id,
            prediction: prediction.into(),
        }
    }
}

/// Body returned by `POST /process`
///
/// Failed responses always carry a non-empty message and an empty data
/// list; successful responses carry an empty message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub result: ResponseStatus,
    pub message: String,
    pub data: Vec<PredictionRecord>,
}

impl PredictionResponse {
    pub fn success(data: Vec<PredictionRecord>) -> Self {
        Self {
            result: ResponseStatus::Success,
            message: String::new(),
            data,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            result: ResponseStatus::Failed,
            message: message.into(),
            data: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == ResponseStatus::Success
    }
}

// ========================================
// Service Types
// ========================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether the classifier was loaded at startup
    pub model_loaded: bool,
    /// Human-readable model state
    pub message: String,
}

/// Root endpoint description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub app: String,
    pub version: String,
    /// "METHOD /path" → description
    pub endpoints: BTreeMap<String, String>,
}

// ========================================
// Tests
// ========================================
