//! Command-line arguments.

use clap::Parser;
use netlog_core::AppConfig;
use std::path::PathBuf;

/// Command-line arguments for netlog
#[derive(Parser, Debug, Default)]
#[command(name = "netlog")]
#[command(about = "Log amateur radio net check-ins with FCC/ISED call sign lookup")]
#[command(version)]
pub struct Args {
    /// Use the default repeater without prompting
    #[arg(short = 'd', long)]
    pub accept_defaults: bool,

    /// Enable debug logging for netlog crates
    #[arg(long)]
    pub debug: bool,

    /// Repeater to log check-ins against (overrides the configured default)
    #[arg(long, value_name = "ID")]
    pub repeater: Option<String>,

    /// Check-in database file
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Configuration file to load instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Layer the command-line flags over a loaded configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if self.accept_defaults {
            config.net.accept_defaults = true;
        }
        if let Some(repeater) = &self.repeater {
            let repeater = repeater.trim().to_uppercase();
            if !repeater.is_empty() {
                config.net.default_repeater = repeater;
            }
        }
        if let Some(database) = &self.database {
            config.database.path = Some(database.clone());
        }
    }
}
