//! FCC Universal Licensing System lookups.
//!
//! The ULS amateur search is a session-based JSP application: the search page
//! hands out a session cookie, the results page lists matching licenses, and
//! each license has a detail page with the licensee address and amateur data.

use crate::client::{base_url, body_text, http_client, join, RegistryClient};
use crate::error::{LookupError, Result};
use crate::html::{
    collapse_whitespace, full_text, own_text, row_cells, section_body, selector, table_rows,
    value_after_label,
};
use crate::normalizer::RawFields;
use crate::states::expand_state;
use async_trait::async_trait;
use chrono::NaiveDate;
use netlog_core::{LookupConfig, Registry};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, CACHE_CONTROL, ORIGIN, REFERER};
use scraper::Html;
use url::Url;

const REGISTRY: Registry = Registry::American;
const SEARCH_PAGE: &str = "searchAmateur.jsp";
const RESULTS_PAGE: &str = "results.jsp";
const EXPIRATION_FORMAT: &str = "%m/%d/%Y";
/// Amateur Data labels are plain cells.
const LABEL_CELL: &str = "td";

/// First matching row of the ULS results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRow {
    pub detail_link: String,
    pub call_sign: String,
    pub full_name: String,
    pub frn: String,
    pub status: String,
    pub expiration_date: Option<NaiveDate>,
}

/// Fields taken from a license detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseDetails {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub qualifications: Option<String>,
}

/// Form fields for an exact call-sign search, sorted by call sign.
fn search_form(call_sign: &str) -> [(&'static str, &str); 19] {
    [
        ("fiUlsExactMatchInd", "Y"),
        ("fiulsTrusteeName", ""),
        ("fiOwnerName", ""),
        ("fiUlsFRN", ""),
        ("fiCity", ""),
        ("ulsState", ""),
        ("fiUlsZipcode", ""),
        ("ulsCallSign", call_sign),
        ("statusAll", "Y"),
        ("ulsDateType", ""),
        ("dateSearchType", ""),
        ("ulsFromDate", ""),
        ("ulsToDate", ""),
        ("fiRowsPerPage", "100"),
        ("ulsSortBy", "uls_l_callsign"),
        ("ulsOrderBy", "ASC"),
        ("Submit", "Submit"),
        ("hiddenForm", "hiddenForm"),
        ("jsValidated", "true"),
    ]
}

/// `action` of the amateur search form, if the page still has one.
#[must_use]
pub fn parse_search_form_action(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let form = selector(r#"form[name="amateurSearch"]"#);
    document
        .select(&form)
        .next()
        .and_then(|form| form.value().attr("action"))
        .map(|action| action.trim().to_string())
        .filter(|action| !action.is_empty())
}

/// First license row of a results page, `None` when the search matched nothing.
///
/// Columns: result number, call sign (linked to the detail page), name, FRN,
/// radio service, status, expiration date.
pub fn parse_results_page(html: &str) -> Result<Option<LicenseRow>> {
    let document = Html::parse_document(html);
    let results = selector(r#"table[summary="License search results"]"#);
    let Some(table) = document.select(&results).next() else {
        return Ok(None);
    };

    let th = selector("th");
    let Some(row) = table_rows(table)
        .into_iter()
        .find(|row| row.select(&th).next().is_none())
    else {
        return Ok(None);
    };

    let cells = row_cells(row);
    if cells.len() < 7 {
        return Err(LookupError::data_shape(
            REGISTRY,
            format!("results row has {} columns, expected 7", cells.len()),
        ));
    }

    let link = selector("a[href]");
    let call_sign_link = cells[1]
        .select(&link)
        .next()
        .ok_or_else(|| LookupError::data_shape(REGISTRY, "results row has no license link"))?;
    let detail_link = call_sign_link
        .value()
        .attr("href")
        .unwrap_or_default()
        .trim()
        .to_string();

    let expiration = full_text(cells[6]);
    let expiration_date = if expiration.is_empty() {
        None
    } else {
        let date = NaiveDate::parse_from_str(&expiration, EXPIRATION_FORMAT).map_err(|e| {
            LookupError::data_shape(
                REGISTRY,
                format!("unreadable expiration date '{expiration}': {e}"),
            )
        })?;
        Some(date)
    };

    Ok(Some(LicenseRow {
        detail_link,
        call_sign: full_text(call_sign_link),
        full_name: full_text(cells[2]),
        frn: full_text(cells[3]),
        status: full_text(cells[5]),
        expiration_date,
    }))
}

static STATE_ZIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{2})\s+([0-9]{5}(?:-[0-9]{4})?)$").expect("state/ZIP regex is valid")
});

/// Split the licensee address block into street, city, state code and ZIP.
///
/// The block repeats the licensee name first; that line is dropped. Lines are
/// split on commas, and a trailing `ST 12345` line is split in two. Anything
/// other than exactly four components is a data-shape failure.
pub fn split_address(lines: &[String], full_name: &str) -> Result<[String; 4]> {
    let full_name = collapse_whitespace(full_name);
    let mut parts: Vec<String> = lines
        .iter()
        .map(|line| collapse_whitespace(line))
        .filter(|line| !line.is_empty() && *line != full_name)
        .flat_map(|line| {
            line.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect();

    if parts.len() == 3 {
        if let Some(captures) = STATE_ZIP.captures(&parts[2]) {
            let state = captures[1].to_string();
            let zip = captures[2].to_string();
            parts.splice(2..3, [state, zip]);
        }
    }

    <[String; 4]>::try_from(parts).map_err(|parts| {
        LookupError::data_shape(
            REGISTRY,
            format!(
                "licensee address has {} components, expected 4: {parts:?}",
                parts.len()
            ),
        )
    })
}

/// Address and qualifications from a license detail page.
pub fn parse_license_page(html: &str, full_name: &str) -> Result<LicenseDetails> {
    let document = Html::parse_document(html);

    let licensee = section_body(&document, &["Licensee", "Information"]).ok_or_else(|| {
        LookupError::data_shape(REGISTRY, "no Licensee Information section")
    })?;
    let table = selector("table");
    let address_lines = licensee
        .select(&table)
        .next()
        .and_then(|table| table_rows(table).get(2).copied())
        .and_then(|row| row_cells(row).first().copied())
        .map(own_text)
        .ok_or_else(|| LookupError::data_shape(REGISTRY, "no licensee address cell"))?;
    let [address, city, state, postal_code] = split_address(&address_lines, full_name)?;

    let qualifications = section_body(&document, &["Amateur", "Data"]).and_then(|amateur| {
        let class = value_after_label(amateur, LABEL_CELL, "Operator Class")?;
        Some(match value_after_label(amateur, LABEL_CELL, "Group") {
            Some(group) => format!("{class} - Group {group}"),
            None => class,
        })
    });

    Ok(LicenseDetails {
        address,
        city,
        state,
        postal_code,
        qualifications,
    })
}

/// Client for the FCC ULS amateur license search.
///
/// Every lookup builds its own HTTP client, so the session cookie handed out
/// by the search page is scoped to that one lookup.
pub struct AmericanRegistryClient {
    config: LookupConfig,
    base_url: Url,
}

impl AmericanRegistryClient {
    /// Create a client for the configured ULS base URL.
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            base_url: base_url(&config.american_base_url, REGISTRY)?,
        })
    }

    /// Where to post the search: the live form action when it is usable,
    /// otherwise the known results page.
    fn results_endpoint(&self, search_url: &Url, action: Option<&str>) -> Result<Url> {
        let default = join(&self.base_url, RESULTS_PAGE, REGISTRY)?;
        let Some(action) = action else {
            tracing::debug!("ULS search form not found, posting to {}", default);
            return Ok(default);
        };

        match search_url.join(action) {
            Ok(live) if live == default => Ok(default),
            Ok(live)
                if matches!(live.scheme(), "http" | "https")
                    && live.host_str() == default.host_str() =>
            {
                tracing::info!("ULS search form posts to {} instead of {}", live, default);
                Ok(live)
            }
            _ => {
                tracing::warn!("Ignoring unusable ULS form action '{}'", action);
                Ok(default)
            }
        }
    }
}

#[async_trait]
impl RegistryClient for AmericanRegistryClient {
    async fn lookup(&self, call_sign: &str) -> Result<Option<RawFields>> {
        let call_sign = call_sign.trim().to_uppercase();
        let client = http_client(&self.config, REGISTRY, true)?;

        let search_url = join(&self.base_url, SEARCH_PAGE, REGISTRY)?;
        let response = client
            .get(search_url.clone())
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(LookupError::network(REGISTRY))?;
        let search_page = body_text(response, REGISTRY).await?;
        let results_url =
            self.results_endpoint(&search_url, parse_search_form_action(&search_page).as_deref())?;

        tracing::debug!(call_sign = %call_sign, "Searching ULS at {}", results_url);
        let response = client
            .post(results_url)
            .header(ACCEPT, "*/*")
            .header(REFERER, search_url.as_str())
            .header(ORIGIN, self.base_url.origin().ascii_serialization())
            .header(CACHE_CONTROL, "max-age=0")
            .form(&search_form(&call_sign))
            .send()
            .await
            .map_err(LookupError::network(REGISTRY))?;
        let results_page = body_text(response, REGISTRY).await?;

        let Some(row) = parse_results_page(&results_page)? else {
            tracing::info!(call_sign = %call_sign, "No ULS license matches");
            return Ok(None);
        };

        let detail_url = join(&self.base_url, &row.detail_link, REGISTRY)?;
        let response = client
            .get(detail_url)
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(LookupError::network(REGISTRY))?;
        let license_page = body_text(response, REGISTRY).await?;
        let details = parse_license_page(&license_page, &row.full_name)?;

        let call_sign = if row.call_sign.is_empty() {
            call_sign
        } else {
            row.call_sign
        };

        Ok(Some(RawFields {
            call_sign,
            full_name: Some(row.full_name),
            address: Some(details.address),
            city: Some(details.city),
            province: Some(expand_state(&details.state)),
            postal_code: Some(details.postal_code),
            qualifications: details.qualifications,
            status: Some(row.status),
            expiration_date: row.expiration_date,
            frn: Some(row.frn),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"
        <html><body>
        <table summary="License search results">
          <tr><th>#</th><th>Call Sign/Lease ID</th><th>Name</th><th>FRN</th>
              <th>Radio Service</th><th>Status</th><th>Expiration Date</th></tr>
          <tr>
            <td>1</td>
            <td><a href="license.jsp?licKey=4242">K1ABC</a></td>
            <td>DOE, JOHN Q</td>
            <td>0012345678</td>
            <td>HA</td>
            <td>Active</td>
            <td>03/14/2031</td>
          </tr>
        </table>
        </body></html>
    "#;

    const LICENSE: &str = r#"
        <html><body>
        <table>
          <tr><td><table><tr><td class="cell-pri-light"><b>Licensee Information</b></td></tr></table></td></tr>
          <tr><td><table>
            <tr><td>Licensee</td></tr>
            <tr><td>Type</td><td>Individual</td></tr>
            <tr><td>DOE, JOHN Q<br/>12 ELM ST<br/>SPRINGFIELD, IL<br/>62701</td></tr>
          </table></td></tr>
          <tr><td><table><tr><td><b>Amateur Data</b></td></tr></table></td></tr>
          <tr><td><table>
            <tr><td>Operator Class</td><td>Extra</td></tr>
            <tr><td>Group</td><td>A</td></tr>
          </table></td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_page() {
        let row = parse_results_page(RESULTS)
            .expect("parse should succeed")
            .expect("one match");
        assert_eq!(row.detail_link, "license.jsp?licKey=4242");
        assert_eq!(row.call_sign, "K1ABC");
        assert_eq!(row.full_name, "DOE, JOHN Q");
        assert_eq!(row.frn, "0012345678");
        assert_eq!(row.status, "Active");
        assert_eq!(row.expiration_date, NaiveDate::from_ymd_opt(2031, 3, 14));
    }

    #[test]
    fn test_parse_results_page_without_rows() {
        let html = r#"<table summary="License search results">
            <tr><th>#</th><th>Call Sign/Lease ID</th></tr></table>"#;
        assert_eq!(parse_results_page(html).expect("parse"), None);
        assert_eq!(parse_results_page("<p>No matches</p>").expect("parse"), None);
    }

    #[test]
    fn test_parse_results_page_bad_date() {
        let html = RESULTS.replace("03/14/2031", "2031-03-14");
        let err = parse_results_page(&html).expect_err("bad date");
        assert!(matches!(err, LookupError::DataShape { .. }));
    }

    #[test]
    fn test_parse_license_page() {
        let details = parse_license_page(LICENSE, "DOE, JOHN Q").expect("parse license");
        assert_eq!(
            details,
            LicenseDetails {
                address: "12 ELM ST".to_string(),
                city: "SPRINGFIELD".to_string(),
                state: "IL".to_string(),
                postal_code: "62701".to_string(),
                qualifications: Some("Extra - Group A".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_license_page_without_licensee_section() {
        let err = parse_license_page("<html></html>", "DOE, JOHN Q").expect_err("no section");
        assert!(matches!(err, LookupError::DataShape { .. }));
    }

    #[test]
    fn test_split_address_state_and_zip_on_one_line() {
        let lines = vec![
            "DOE, JOHN Q".to_string(),
            "12 ELM ST".to_string(),
            "SPRINGFIELD, IL 62701-1234".to_string(),
        ];
        let parts = split_address(&lines, "DOE, JOHN Q").expect("split");
        assert_eq!(parts, ["12 ELM ST", "SPRINGFIELD", "IL", "62701-1234"]);
    }

    #[test]
    fn test_split_address_name_with_extra_spaces() {
        let lines = vec![
            "DOE,  JOHN   Q".to_string(),
            "12 ELM ST".to_string(),
            "SPRINGFIELD, IL".to_string(),
            "62701".to_string(),
        ];
        let parts = split_address(&lines, "DOE, JOHN Q").expect("split");
        assert_eq!(parts, ["12 ELM ST", "SPRINGFIELD", "IL", "62701"]);
    }

    #[test]
    fn test_split_address_wrong_shape() {
        let lines = vec![
            "DOE, JOHN Q".to_string(),
            "ATTN JANE DOE".to_string(),
            "12 ELM ST".to_string(),
            "SPRINGFIELD, IL".to_string(),
            "62701".to_string(),
        ];
        let err = split_address(&lines, "DOE, JOHN Q").expect_err("five components");
        assert!(err.to_string().contains("5 components"));
    }

    #[test]
    fn test_parse_search_form_action() {
        let html = r#"<form name="amateurSearch" action="results.jsp;jsessionid=abc" method="post"></form>"#;
        assert_eq!(
            parse_search_form_action(html).as_deref(),
            Some("results.jsp;jsessionid=abc")
        );
        assert_eq!(parse_search_form_action("<form name=\"other\"></form>"), None);
    }

    #[test]
    fn test_results_endpoint_prefers_live_action_on_same_host() {
        let client = AmericanRegistryClient::new(&LookupConfig::default()).expect("client");
        let search = join(&client.base_url, SEARCH_PAGE, REGISTRY).expect("search url");

        let default = client.results_endpoint(&search, None).expect("default");
        assert_eq!(default.path(), "/UlsApp/UlsSearch/results.jsp");

        let live = client
            .results_endpoint(&search, Some("results2.jsp"))
            .expect("live");
        assert_eq!(live.path(), "/UlsApp/UlsSearch/results2.jsp");

        let foreign = client
            .results_endpoint(&search, Some("https://example.com/steal.jsp"))
            .expect("foreign");
        assert_eq!(foreign, default);
    }
}
