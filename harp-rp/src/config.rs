//! Command-line arguments and configuration resolution for harp-rp
//!
//! **Priority:** CLI → ENV (`HARP_*`) → TOML → compiled defaults, as
//! implemented by [`harp_common::config::ConfigResolver`].

use clap::Parser;
use harp_common::config::{CliOverrides, ConfigResolver, ServiceConfig};
use harp_common::Result;
use std::path::PathBuf;

/// Module name used for the default TOML file (`harp-rp.toml`)
pub const MODULE_NAME: &str = "harp-rp";

/// Command-line arguments for harp-rp
#[derive(Parser, Debug, Default)]
#[command(name = "harp-rp")]
#[command(about = "Heart attack risk prediction service")]
#[command(version)]
pub struct CliArgs {
    /// Host to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the classifier artifact (JSON)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl From<&CliArgs> for CliOverrides {
    fn from(args: &CliArgs) -> Self {
        CliOverrides {
            host: args.host.clone(),
            port: args.port,
            model_path: args.model.clone(),
            config_path: args.config.clone(),
        }
    }
}

/// Resolve the service configuration for these arguments
pub fn resolve(args: &CliArgs) -> Result<ServiceConfig> {
    ConfigResolver::new(MODULE_NAME).resolve(&CliOverrides::from(args))
}
