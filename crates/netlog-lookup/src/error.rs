use netlog_core::Registry;
use thiserror::Error;

/// Why a registry lookup could not produce raw fields.
///
/// A call sign that simply isn't on file is not an error; clients return
/// `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("network error talking to {registry}: {source}")]
    Network {
        registry: Registry,
        #[source]
        source: reqwest::Error,
    },

    #[error("{registry} answered with HTTP {status}")]
    Http { registry: Registry, status: u16 },

    #[error("unexpected {registry} page structure: {reason}")]
    DataShape { registry: Registry, reason: String },

    #[error("invalid {registry} URL '{url}': {source}")]
    InvalidUrl {
        registry: Registry,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// A check-in request that cannot produce a well-formed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("call sign is blank")]
    BlankCallSign,

    #[error("repeater is blank")]
    BlankRepeater,
}

/// Coarse classification of a lookup failure, as reported upward by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection refused, timed out, or the registry answered with an error status
    Network,
    /// The registry answered but the page did not have the expected structure
    DataShape,
}

impl LookupError {
    pub(crate) fn network(registry: Registry) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Network { registry, source }
    }

    pub(crate) fn data_shape(registry: Registry, reason: impl Into<String>) -> Self {
        Self::DataShape {
            registry,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> Registry {
        match self {
            Self::Network { registry, .. }
            | Self::Http { registry, .. }
            | Self::DataShape { registry, .. }
            | Self::InvalidUrl { registry, .. } => *registry,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } | Self::Http { .. } => FailureKind::Network,
            Self::DataShape { .. } | Self::InvalidUrl { .. } => FailureKind::DataShape,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
