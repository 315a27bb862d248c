//! # HARP Common Library
//!
//! Shared code for the HARP (Heart Attack Risk Prediction) workspace:
//! - Common error type
//! - Configuration loading (CLI / ENV / TOML / compiled defaults)
//! - API request/response types

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
