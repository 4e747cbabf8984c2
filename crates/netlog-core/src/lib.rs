//! Netlog Core - Foundation crate for the netlog check-in logger.
//!
//! This crate provides the canonical operator record, registry identifiers,
//! configuration errors, and configuration management that the other netlog crates
//! depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared domain types (`OperatorRecord`, `Registry`)
//!
//! # Example
//!
//! ```rust
//! use netlog_core::{AppConfig, Registry};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.net.default_repeater, "VE7RVF");
//! assert_eq!(Registry::Canadian.to_string(), "ISED");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, DatabaseConfig, LookupConfig, NetConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::{OperatorRecord, Registry};
