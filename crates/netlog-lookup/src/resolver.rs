//! Call-sign resolution.
//!
//! This module provides the `OperatorResolver`, which classifies a call sign,
//! asks the matching registry about it, and turns whatever comes back into an
//! [`OperatorRecord`]. Lookup failures never escape: they are logged and the
//! check-in falls back to a bare record.

use crate::american::AmericanRegistryClient;
use crate::canadian::CanadianRegistryClient;
use crate::classifier::{classify, normalize_call_sign};
use crate::client::RegistryClient;
use crate::error::{FailureKind, InputError, Result};
use crate::normalizer::{normalize, RawFields};
use chrono::Utc;
use netlog_core::{LookupConfig, OperatorRecord, Registry};
use std::fmt;
use std::sync::Arc;

/// How a resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The registry had the license on file
    Found(Registry),
    /// The registry was asked but had no record of the sign
    NotFound(Registry),
    /// The sign fits neither grammar, so no registry was asked
    Unclassified,
    /// The lookup failed part way through
    Failed {
        /// Registry that was being queried
        registry: Registry,
        /// Network or page-structure failure
        kind: FailureKind,
        /// Human-readable cause
        reason: String,
    },
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(registry) => write!(f, "found in {registry}"),
            Self::NotFound(registry) => write!(f, "not found in {registry}"),
            Self::Unclassified => f.write_str("not a recognised call sign"),
            Self::Failed { reason, .. } => write!(f, "lookup failed: {reason}"),
        }
    }
}

/// A resolved check-in: always a well-formed record, plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The record to store
    pub record: OperatorRecord,
    /// Whether the registry supplied the details
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    /// Whether the record was filled from a registry.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Found(_))
    }
}

/// Resolves call signs against the American and Canadian registries.
#[derive(Clone)]
pub struct OperatorResolver {
    american: Arc<dyn RegistryClient>,
    canadian: Arc<dyn RegistryClient>,
}

impl OperatorResolver {
    /// Create a resolver over explicit registry clients.
    #[must_use]
    pub fn new(american: Arc<dyn RegistryClient>, canadian: Arc<dyn RegistryClient>) -> Self {
        Self { american, canadian }
    }

    /// Create a resolver talking to the real registries.
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(AmericanRegistryClient::new(config)?),
            Arc::new(CanadianRegistryClient::new(config)?),
        ))
    }

    fn client_for(&self, registry: Registry) -> &dyn RegistryClient {
        match registry {
            Registry::American => self.american.as_ref(),
            Registry::Canadian => self.canadian.as_ref(),
        }
    }

    /// Resolve one check-in.
    ///
    /// Registry trouble never fails the call. The only error is a blank call
    /// sign or repeater, which could not form a record at all.
    pub async fn resolve(
        &self,
        call_sign: &str,
        repeater: &str,
    ) -> std::result::Result<Resolution, InputError> {
        let sign = normalize_call_sign(call_sign);
        if sign.is_empty() {
            return Err(InputError::BlankCallSign);
        }
        if repeater.trim().is_empty() {
            return Err(InputError::BlankRepeater);
        }

        let (raw, outcome) = match classify(&sign) {
            None => {
                tracing::info!(call_sign = %sign, "Not a recognised call sign, skipping lookup");
                (RawFields::bare(&sign), ResolutionOutcome::Unclassified)
            }
            Some(registry) => self.look_up(registry, &sign).await,
        };

        Ok(Resolution {
            record: normalize(raw, repeater, Utc::now()),
            outcome,
        })
    }

    async fn look_up(&self, registry: Registry, sign: &str) -> (RawFields, ResolutionOutcome) {
        tracing::debug!(call_sign = %sign, registry = %registry, "Looking up call sign");

        match self.client_for(registry).lookup(sign).await {
            Ok(Some(mut raw)) => {
                if raw.call_sign.trim().is_empty() {
                    raw.call_sign = sign.to_string();
                }
                tracing::info!(call_sign = %sign, registry = %registry, "Call sign resolved");
                (raw, ResolutionOutcome::Found(registry))
            }
            Ok(None) => {
                tracing::info!(call_sign = %sign, registry = %registry, "Call sign not on file");
                (RawFields::bare(sign), ResolutionOutcome::NotFound(registry))
            }
            Err(e) => {
                let kind = e.kind();
                match kind {
                    FailureKind::Network => tracing::warn!(
                        call_sign = %sign,
                        registry = %registry,
                        timeout = e.is_timeout(),
                        error = %e,
                        "Registry unreachable, recording bare check-in"
                    ),
                    FailureKind::DataShape => tracing::warn!(
                        call_sign = %sign,
                        registry = %registry,
                        error = %e,
                        "Registry page not understood, recording bare check-in"
                    ),
                }
                (
                    RawFields::bare(sign),
                    ResolutionOutcome::Failed {
                        registry,
                        kind,
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}
