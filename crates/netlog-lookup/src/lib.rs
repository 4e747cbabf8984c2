//! Netlog Lookup - Call-sign resolution against the public license registries.
//!
//! This crate decides which registry a call sign belongs to, scrapes the
//! license details from that registry's web application, and normalizes the
//! result into an [`netlog_core::OperatorRecord`]. A lookup never fails the
//! check-in: when the registry is unreachable, has no record, or returns a page
//! that cannot be read, the resolver falls back to a record carrying only the
//! call sign and repeater.
//!
//! # Features
//!
//! - American (FCC ULS) and Canadian (ISED) call-sign grammars
//! - Session-aware ULS search with per-lookup cookie jars
//! - Configurable connect and read timeouts
//! - Failures classified as network or data-shape problems
//!
//! # Example
//!
//! ```rust,ignore
//! use netlog_core::AppConfig;
//! use netlog_lookup::OperatorResolver;
//!
//! let config = AppConfig::load()?;
//! let resolver = OperatorResolver::from_config(&config.lookup)?;
//!
//! let resolution = resolver.resolve("VE7ABC", "VE7RVF").await?;
//! println!("{}", resolution.record);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod american;
pub mod canadian;
pub mod classifier;
pub mod client;
#[allow(missing_docs)]
pub mod error;
mod html;
#[allow(missing_docs)]
pub mod normalizer;
pub mod resolver;
pub mod states;

// Re-export commonly used types
pub use american::AmericanRegistryClient;
pub use canadian::CanadianRegistryClient;
pub use classifier::{classify, is_american, is_canadian, normalize_call_sign};
pub use client::RegistryClient;
pub use error::{FailureKind, InputError, LookupError, Result};
pub use normalizer::{normalize, RawFields};
pub use resolver::{OperatorResolver, Resolution, ResolutionOutcome};
pub use states::expand_state;
