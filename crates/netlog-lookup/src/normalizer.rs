//! Canonicalization of registry output into an [`OperatorRecord`].

use chrono::{DateTime, NaiveDate, Utc};
use netlog_core::OperatorRecord;

/// Fields as a registry client extracted them, before cleanup.
///
/// Strings may carry surrounding whitespace or be blank; the normalizer
/// decides what counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub call_sign: String,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub qualifications: Option<String>,
    pub status: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub frn: Option<String>,
}

impl RawFields {
    /// Skeleton carrying only the call sign, used when no lookup succeeded.
    #[must_use]
    pub fn bare(call_sign: impl Into<String>) -> Self {
        Self {
            call_sign: call_sign.into(),
            ..Self::default()
        }
    }
}

impl From<OperatorRecord> for RawFields {
    fn from(record: OperatorRecord) -> Self {
        Self {
            call_sign: record.call_sign,
            full_name: Some(record.full_name),
            address: record.address,
            city: record.city,
            province: record.province,
            postal_code: record.postal_code,
            qualifications: record.qualifications,
            status: record.status,
            expiration_date: record.expiration_date,
            frn: record.frn,
        }
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build the canonical record for one check-in.
///
/// Optional strings are trimmed and blank ones become `None`. The call sign is
/// trimmed and uppercased; the full name is trimmed but stays a (possibly
/// empty) string.
#[must_use]
pub fn normalize(raw: RawFields, repeater: &str, checkin_date: DateTime<Utc>) -> OperatorRecord {
    OperatorRecord {
        call_sign: raw.call_sign.trim().to_uppercase(),
        full_name: raw
            .full_name
            .map(|name| name.trim().to_string())
            .unwrap_or_default(),
        address: optional(raw.address),
        city: optional(raw.city),
        province: optional(raw.province),
        postal_code: optional(raw.postal_code),
        qualifications: optional(raw.qualifications),
        status: optional(raw.status),
        expiration_date: raw.expiration_date,
        frn: optional(raw.frn),
        repeater: repeater.trim().to_string(),
        checkin_date,
    }
}
