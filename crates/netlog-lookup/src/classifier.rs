//! Call-sign grammar matching.
//!
//! Decides which registry, if any, a call sign belongs to. American signs are
//! matched against the FCC sequential call-sign groups; Canadian signs must
//! have the ISED shape and start with one of the regional prefixes.

use netlog_core::Registry;
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

/// FCC call-sign groups, one pattern per group.
const AMERICAN_GROUPS: [&str; 7] = [
    // Group D: 2x3
    r"^[KW][A-Z][0-9][A-Z]{3}$",
    // Group C: 1x3
    r"^[KNW][0-9][A-Z]{3}$",
    // Group C: Alaska, Hawaii and Pacific 2x3
    r"^(KL|NL|WL|NP|WP|KH|NH|WH)[0-9][A-Z]{3}$",
    // Group B: 2x2
    r"^[KNW][A-Z][0-9][A-Z]{2}$",
    // Group A: 2x2 in the AA-AK block
    r"^A[A-K][0-9][A-Z]{2}$",
    // Group A: 2x1
    r"^(A[A-K]|[KNW][A-Z])[0-9][A-Z]$",
    // Group A: 1x2
    r"^[KNW][0-9][A-Z]{2}$",
];

const CANADIAN_PREFIXES: [&str; 25] = [
    "VE1", "VA1", // Nova Scotia
    "VE2", "VA2", // Quebec
    "VE3", "VA3", // Ontario
    "VE4", "VA4", // Manitoba
    "VE5", "VA5", // Saskatchewan
    "VE6", "VA6", // Alberta
    "VE7", "VA7", // British Columbia
    "VE8", // Northwest Territories
    "VE9", // New Brunswick
    "VE0", // International waters
    "VO1", // Newfoundland
    "VO2", // Labrador
    "VY1", // Yukon
    "VY2", // Prince Edward Island
    "VY9", // Government of Canada
    "VY0", // Nunavut
    "CY0", // Sable Island
    "CY9", // St. Paul Island
];

static AMERICAN_PATTERNS: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new(AMERICAN_GROUPS).expect("call-sign group regexes are valid"));

static CANADIAN_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9][A-Z]{2,3}$").expect("Canadian shape regex is valid")
});

/// Uppercase a call sign and drop the whitespace and hyphens operators type into it.
#[must_use]
pub fn normalize_call_sign(sign: &str) -> String {
    sign.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Whether the sign fits one of the FCC amateur call-sign groups.
#[must_use]
pub fn is_american(sign: &str) -> bool {
    let sign = normalize_call_sign(sign);
    !sign.is_empty() && AMERICAN_PATTERNS.is_match(&sign)
}

/// Whether the sign has the Canadian shape and a Canadian regional prefix.
#[must_use]
pub fn is_canadian(sign: &str) -> bool {
    let sign = normalize_call_sign(sign);
    if sign.is_empty() {
        return false;
    }
    let has_prefix = CANADIAN_PREFIXES
        .iter()
        .any(|prefix| sign.starts_with(prefix));
    has_prefix && CANADIAN_SHAPE.is_match(&sign)
}

/// Pick the registry to query, American first. `None` means no lookup should be attempted.
#[must_use]
pub fn classify(sign: &str) -> Option<Registry> {
    if is_american(sign) {
        Some(Registry::American)
    } else if is_canadian(sign) {
        Some(Registry::Canadian)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMERICAN: [&str; 9] = [
        "KA1ABC", "W1AW", "K1ABC", "KL7ABC", "NH6XY", "KB2XY", "AA1AB", "AK1A", "N2XY",
    ];

    #[test]
    fn test_american_signs() {
        for sign in AMERICAN {
            assert!(is_american(sign), "{sign} should be American");
            assert!(!is_canadian(sign), "{sign} should not be Canadian");
            assert_eq!(classify(sign), Some(Registry::American));
        }
    }

    #[test]
    fn test_every_canadian_prefix() {
        for prefix in CANADIAN_PREFIXES {
            for suffix in ["AB", "ABC"] {
                let sign = format!("{prefix}{suffix}");
                assert!(is_canadian(&sign), "{sign} should be Canadian");
                assert!(!is_american(&sign), "{sign} should not be American");
                assert_eq!(classify(&sign), Some(Registry::Canadian));
            }
        }
    }

    #[test]
    fn test_canadian_shape_required() {
        // Right prefix, wrong shape.
        assert!(!is_canadian("VE7A"));
        assert!(!is_canadian("VE7ABCD"));
        // Right shape, prefix not allocated to a region.
        assert!(!is_canadian("VB7ABC"));
        assert!(!is_canadian("XE1ABC"));
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_call_sign(" ve7-abc "), "VE7ABC");
        assert_eq!(normalize_call_sign("k 1 a b c"), "K1ABC");
        assert!(is_canadian("ve7-abc"));
        assert!(is_american(" w1aw "));
    }

    #[test]
    fn test_empty_and_blank_input() {
        for sign in ["", " ", "\t\n", " - "] {
            assert!(!is_american(sign));
            assert!(!is_canadian(sign));
            assert_eq!(classify(sign), None);
        }
    }

    #[test]
    fn test_unclassifiable() {
        for sign in ["1234", "G4ABC", "K1ABCDEF", "VE7ABC1", "ABC"] {
            assert_eq!(classify(sign), None, "{sign} should be unclassified");
        }
    }
}
