//! ISED amateur radio call sign database lookups.
//!
//! The ISED query application is stateless: one form post returns a result
//! list linking each call sign to its detail page, and the detail page is a
//! two-column table of labels and values. Only active licenses are listed.

use crate::client::{base_url, body_text, http_client, join, RegistryClient};
use crate::error::{LookupError, Result};
use crate::html::{link_with_text, value_after_label};
use crate::normalizer::RawFields;
use async_trait::async_trait;
use netlog_core::{LookupConfig, Registry};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use scraper::Html;
use url::Url;

const REGISTRY: Registry = Registry::Canadian;
const QUERY_ACTION: &str = "query_amat_cs$callsign.actionquery";
/// Detail page labels are header cells.
const LABEL_CELL: &str = "th";

/// `href` of the result link for exactly this call sign.
#[must_use]
pub fn parse_query_page(html: &str, call_sign: &str) -> Option<String> {
    let document = Html::parse_document(html);
    link_with_text(&document, call_sign).map(ToString::to_string)
}

/// Raw fields from a call sign detail page.
///
/// The call sign row is required; every other label may be missing.
pub fn parse_detail_page(html: &str) -> Result<RawFields> {
    let document = Html::parse_document(html);
    let page = document.root_element();
    let field = |label: &str| value_after_label(page, LABEL_CELL, label);

    let call_sign = field("Call Sign")
        .ok_or_else(|| LookupError::data_shape(REGISTRY, "detail page has no Call Sign row"))?;

    Ok(RawFields {
        call_sign,
        full_name: field("Name"),
        address: field("Address"),
        city: field("City"),
        province: field("Province"),
        postal_code: field("Postal Code"),
        qualifications: field("Qualifications")
            .map(|qualifications| clean_qualifications(&qualifications)),
        status: Some("Active".to_string()),
        expiration_date: None,
        frn: None,
    })
}

/// Tidy the comma-separated qualification list.
///
/// "Basic with Honours" is shortened to "Basic+", and a plain "Basic" next to
/// it is dropped as redundant. Order is preserved.
#[must_use]
pub fn clean_qualifications(qualifications: &str) -> String {
    let tokens: Vec<&str> = qualifications
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token == "Basic with Honours" {
                "Basic+"
            } else {
                token
            }
        })
        .collect();

    let has_honours = tokens.contains(&"Basic+");
    tokens
        .into_iter()
        .filter(|token| !(has_honours && *token == "Basic"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Client for the ISED amateur call sign query.
pub struct CanadianRegistryClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CanadianRegistryClient {
    /// Create a client for the configured ISED base URL.
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config, REGISTRY, false)?,
            base_url: base_url(&config.canadian_base_url, REGISTRY)?,
        })
    }
}

#[async_trait]
impl RegistryClient for CanadianRegistryClient {
    async fn lookup(&self, call_sign: &str) -> Result<Option<RawFields>> {
        let call_sign = call_sign.trim().to_uppercase();

        let query_url = join(&self.base_url, QUERY_ACTION, REGISTRY)?;
        let response = self
            .client
            .post(query_url)
            .header(ACCEPT, "*/*")
            .header(CACHE_CONTROL, "max-age=0")
            .form(&[
                ("P_CALLSIGN", call_sign.as_str()),
                ("Z_ACTION", "QUERY"),
                ("Z_CHK", "0"),
            ])
            .send()
            .await
            .map_err(LookupError::network(REGISTRY))?;
        let query_page = body_text(response, REGISTRY).await?;

        let Some(detail_link) = parse_query_page(&query_page, &call_sign) else {
            tracing::info!(call_sign = %call_sign, "No ISED call sign matches");
            return Ok(None);
        };

        let detail_url = join(&self.base_url, &detail_link, REGISTRY)?;
        tracing::debug!(call_sign = %call_sign, "Fetching ISED detail page {}", detail_url);
        let response = self
            .client
            .get(detail_url)
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(LookupError::network(REGISTRY))?;
        let detail_page = body_text(response, REGISTRY).await?;

        parse_detail_page(&detail_page).map(Some)
    }
}
