//! Shared types used across netlog.
//!
//! This module defines the canonical operator record produced by a check-in
//! and the identifiers for the public license registries it is looked up in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A public license registry that a call sign can be resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registry {
    /// FCC Universal Licensing System (United States)
    American,
    /// ISED amateur radio call sign database (Canada)
    Canadian,
}

impl Registry {
    /// Short name of the agency operating the registry.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::American => "FCC",
            Self::Canadian => "ISED",
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical record of one check-in.
///
/// `call_sign` and `repeater` are always non-empty. Every optional field is
/// either `Some` with a non-blank value or `None`; blank strings never leak
/// through as "unknown". `full_name` is the one required text field that may
/// be empty, so display code never has to handle a missing name.
///
/// Records are built once per check-in by the resolver and handed straight to
/// storage; nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRecord {
    /// Call sign, uppercase
    pub call_sign: String,
    /// License holder name as the registry lists it
    pub full_name: String,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Province or state, spelled out
    pub province: Option<String>,
    /// Postal or ZIP code
    pub postal_code: Option<String>,
    /// License class and qualification description
    pub qualifications: Option<String>,
    /// License status ("Active" or the registry's own wording)
    pub status: Option<String>,
    /// License expiry (American registry only)
    pub expiration_date: Option<NaiveDate>,
    /// FCC Registration Number (American registry only)
    pub frn: Option<String>,
    /// Repeater the net is running on
    pub repeater: String,
    /// When the check-in was resolved
    pub checkin_date: DateTime<Utc>,
}

impl OperatorRecord {
    /// Whether the record carries nothing beyond the call sign, repeater and time.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.full_name.is_empty()
            && self.address.is_none()
            && self.city.is_none()
            && self.province.is_none()
            && self.postal_code.is_none()
            && self.qualifications.is_none()
            && self.status.is_none()
            && self.expiration_date.is_none()
            && self.frn.is_none()
    }
}

impl fmt::Display for OperatorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.full_name.is_empty() {
            "Unknown operator"
        } else {
            self.full_name.as_str()
        };
        write!(f, "{name} ({})", self.call_sign)?;

        match (&self.city, &self.province) {
            (Some(city), Some(province)) => write!(f, " from {city}, {province}."),
            (Some(city), None) => write!(f, " from {city}."),
            (None, Some(province)) => write!(f, " from {province}."),
            (None, None) => f.write_str("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> OperatorRecord {
        OperatorRecord {
            call_sign: "VE7ABC".to_string(),
            full_name: "Jane Operator".to_string(),
            address: Some("123 Main St".to_string()),
            city: Some("Vancouver".to_string()),
            province: Some("BC".to_string()),
            postal_code: Some("V5K 0A1".to_string()),
            qualifications: Some("Basic+, Advanced".to_string()),
            status: Some("Active".to_string()),
            expiration_date: None,
            frn: None,
            repeater: "VE7RVF".to_string(),
            checkin_date: Utc.with_ymd_and_hms(2024, 5, 1, 19, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_display_with_city() {
        assert_eq!(
            record().to_string(),
            "Jane Operator (VE7ABC) from Vancouver, BC."
        );
    }

    #[test]
    fn test_display_without_city() {
        let mut rec = record();
        rec.city = None;
        assert_eq!(rec.to_string(), "Jane Operator (VE7ABC) from BC.");
    }

    #[test]
    fn test_display_bare() {
        let rec = OperatorRecord {
            call_sign: "K1ABC".to_string(),
            full_name: String::new(),
            address: None,
            city: None,
            province: None,
            postal_code: None,
            qualifications: None,
            status: None,
            expiration_date: None,
            frn: None,
            repeater: "VE7RVF".to_string(),
            checkin_date: Utc::now(),
        };
        assert!(rec.is_bare());
        assert_eq!(rec.to_string(), "Unknown operator (K1ABC).");
    }

    #[test]
    fn test_registry_display() {
        assert_eq!(Registry::American.to_string(), "FCC");
        assert_eq!(Registry::Canadian.to_string(), "ISED");
        let json = serde_json::to_string(&Registry::Canadian).expect("serialize registry");
        assert_eq!(json, "\"canadian\"");
    }
}
