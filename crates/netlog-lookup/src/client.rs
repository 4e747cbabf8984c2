//! The narrow seam between the resolver and the registry scrapers.

use crate::error::{LookupError, Result};
use crate::normalizer::RawFields;
use async_trait::async_trait;
use netlog_core::{LookupConfig, Registry};
use url::Url;

/// A registry that can be asked about one call sign.
///
/// Implementations return `Ok(None)` when the registry has no record of the
/// sign, and an error only when the exchange itself failed.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Fetch the raw license fields for a normalized call sign.
    async fn lookup(&self, call_sign: &str) -> Result<Option<RawFields>>;
}

/// Build an HTTP client with the configured timeouts.
///
/// `cookies` enables a cookie jar that lives as long as the client does.
pub(crate) fn http_client(
    config: &LookupConfig,
    registry: Registry,
    cookies: bool,
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        .cookie_store(cookies)
        .build()
        .map_err(LookupError::network(registry))
}

/// Parse a configured base URL, making sure relative joins land inside it.
pub(crate) fn base_url(raw: &str, registry: Registry) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|source| LookupError::InvalidUrl {
        registry,
        url: raw.to_string(),
        source,
    })
}

/// Resolve a link found in a registry page against the page it came from.
pub(crate) fn join(base: &Url, link: &str, registry: Registry) -> Result<Url> {
    base.join(link).map_err(|source| LookupError::InvalidUrl {
        registry,
        url: link.to_string(),
        source,
    })
}

/// Fail on non-success statuses, then read the body.
pub(crate) async fn body_text(response: reqwest::Response, registry: Registry) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Http {
            registry,
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(LookupError::network(registry))
}
