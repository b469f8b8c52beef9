//! Phone-number normalization and dialing-form equivalence.
//!
//! WhatsApp sender identifiers arrive with a transport suffix
//! (`6281234567890@c.us`) and users may be stored under either the
//! international form (`62…`) or the local form (`0…`). Access checks
//! treat the two forms as the same number, so every lookup tests both.

/// Country-code prefix for international-form numbers.
const COUNTRY_PREFIX: &str = "62";

/// Leading digit for local-form numbers.
const LOCAL_PREFIX: &str = "0";

/// Strip every non-digit character from a raw sender identifier.
///
/// Drops the `@c.us` transport suffix, plus signs, spaces, and dashes,
/// leaving the canonical digit-only representation.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Compute the alternate dialing form of a canonical (digit-only) number.
///
/// `62…` becomes the local form `0…`; anything else has its leading `0`
/// replaced by `62`. Numbers too short to carry a prefix come back
/// unchanged.
pub fn alternate(canonical: &str) -> String {
    if let Some(rest) = canonical.strip_prefix(COUNTRY_PREFIX) {
        format!("{LOCAL_PREFIX}{rest}")
    } else if let Some(rest) = canonical.strip_prefix(LOCAL_PREFIX) {
        format!("{COUNTRY_PREFIX}{rest}")
    } else {
        canonical.to_string()
    }
}

/// Return both dialing forms of a raw identifier: `(canonical, alternate)`.
pub fn lookup_forms(raw: &str) -> (String, String) {
    let canonical = normalize(raw);
    let alt = alternate(&canonical);
    (canonical, alt)
}
