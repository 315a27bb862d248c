//! HTTP API handlers for harp-rp

pub mod health;
pub mod info;
pub mod process;

pub use health::health_routes;
pub use info::info_routes;
pub use process::process_routes;
