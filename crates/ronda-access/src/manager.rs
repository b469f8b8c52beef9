//! Access-code lifecycle and the access predicate.
//!
//! Users request an `ACCESS-XXXXXX` code, then activate it to claim one of
//! the bounded access-list slots. Issued codes are retained in memory per
//! requesting number and verified with constant-time comparison on
//! activation; a malformed token is rejected on its prefix before any
//! lookup. Super-admins bypass the list and the quota entirely.
//!
//! Every number is checked under both dialing forms (international and
//! local), because the same user may be represented under either.

use std::collections::HashMap;

use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use ronda_types::msisdn;

use crate::store::{AccessStore, StoreError};

/// Prefix every access code starts with.
pub const ACCESS_CODE_PREFIX: &str = "ACCESS-";

/// Number of random characters after the prefix.
const CODE_SUFFIX_LEN: usize = 6;

/// Alphabet for the random code suffix.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by access operations. Each maps to a user-visible
/// denial or usage message; none are process-level failures.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("no access code provided")]
    MissingCode,

    #[error("number is already authorized")]
    AlreadyAuthorized,

    #[error("access list is full (max {0})")]
    QuotaExceeded(usize),

    #[error("access code does not start with {ACCESS_CODE_PREFIX}")]
    InvalidCodeFormat,

    #[error("access code does not match the one issued")]
    CodeMismatch,

    #[error("number is not authorized")]
    NotAuthorized,

    #[error("access store failure: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Issued codes
// ---------------------------------------------------------------------------

/// A freshly issued access code, shown to the requesting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode(pub String);

impl std::fmt::Display for IssuedCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generate a code of the form `ACCESS-` + 6 uppercase alphanumerics,
/// drawing randomness from UUID v4 bytes (CSPRNG).
fn generate_code() -> String {
    let raw = Uuid::new_v4();
    let bytes = raw.as_bytes();

    let mut code = String::with_capacity(ACCESS_CODE_PREFIX.len() + CODE_SUFFIX_LEN);
    code.push_str(ACCESS_CODE_PREFIX);
    for byte in bytes.iter().take(CODE_SUFFIX_LEN) {
        code.push(CODE_CHARSET[(*byte as usize) % CODE_CHARSET.len()] as char);
    }
    code
}

// ---------------------------------------------------------------------------
// AccessManager
// ---------------------------------------------------------------------------

/// Owns the access list, the super-admin set, and the pending-code
/// registry. All mutation flows through the single message-handling path,
/// so the manager is `&mut self` throughout.
pub struct AccessManager<S: AccessStore> {
    store: S,
    super_admins: Vec<String>,
    quota: usize,
    /// Issued but not yet activated codes, keyed by canonical number.
    /// Ephemeral: process memory only, replaced by a repeat request.
    pending: HashMap<String, String>,
}

impl<S: AccessStore> AccessManager<S> {
    /// Create a manager over `store` with the given super-admin numbers
    /// (normalized to digits) and list capacity.
    pub fn new(store: S, super_admins: Vec<String>, quota: usize) -> Self {
        let super_admins = super_admins
            .into_iter()
            .map(|n| msisdn::normalize(&n))
            .filter(|n| !n.is_empty())
            .collect();
        Self {
            store,
            super_admins,
            quota,
            pending: HashMap::new(),
        }
    }

    /// Whether `raw` (canonical or alternate form) is a super-admin or on
    /// the access list. Pure predicate, no side effect.
    pub fn has_access(&self, raw: &str) -> bool {
        let (canonical, alt) = msisdn::lookup_forms(raw);
        self.is_super_admin(&canonical)
            || self.is_super_admin(&alt)
            || self.store.contains(&canonical)
            || self.store.contains(&alt)
    }

    /// Issue a new access code for `raw` and retain it for verification.
    ///
    /// A repeat request replaces any previously issued code.
    pub fn request_code(&mut self, raw: &str) -> Result<IssuedCode, AccessError> {
        let canonical = msisdn::normalize(raw);
        self.check_eligible(&canonical)?;

        let code = generate_code();
        self.pending.insert(canonical.clone(), code.clone());
        info!(number = %canonical, "access code issued");
        Ok(IssuedCode(code))
    }

    /// Activate access for `raw` with the given code.
    ///
    /// The prefix is checked first (`InvalidCodeFormat`); a well-formed
    /// token must then match the code issued to this number
    /// (`CodeMismatch`). On success the number is appended to the list and
    /// persisted synchronously.
    pub fn activate(&mut self, raw: &str, code: Option<&str>) -> Result<(), AccessError> {
        let code = match code {
            Some(c) if !c.trim().is_empty() => c.trim(),
            _ => return Err(AccessError::MissingCode),
        };

        let canonical = msisdn::normalize(raw);
        self.check_eligible(&canonical)?;

        if !code.starts_with(ACCESS_CODE_PREFIX) {
            warn!(number = %canonical, "activation rejected: malformed code");
            return Err(AccessError::InvalidCodeFormat);
        }

        match self.pending.get(&canonical) {
            Some(issued) if constant_time_eq(issued, code) => {}
            _ => {
                warn!(number = %canonical, "activation rejected: code mismatch");
                return Err(AccessError::CodeMismatch);
            }
        }

        self.pending.remove(&canonical);
        self.store.add(canonical.clone())?;
        info!(number = %canonical, entries = self.store.len(), "access activated");
        Ok(())
    }

    /// Remove `raw` from the access list (either dialing form).
    pub fn revoke(&mut self, raw: &str) -> Result<(), AccessError> {
        let (canonical, alt) = msisdn::lookup_forms(raw);

        if self.store.remove(&canonical)? || self.store.remove(&alt)? {
            info!(number = %canonical, entries = self.store.len(), "access revoked");
            Ok(())
        } else {
            Err(AccessError::NotAuthorized)
        }
    }

    /// The access list in insertion order, for display.
    pub fn list(&self) -> Vec<String> {
        self.store.list()
    }

    /// Shared eligibility gate for request and activation: not already on
    /// the list, and a slot still free.
    fn check_eligible(&self, canonical: &str) -> Result<(), AccessError> {
        let alt = msisdn::alternate(canonical);
        if self.store.contains(canonical) || self.store.contains(&alt) {
            return Err(AccessError::AlreadyAuthorized);
        }
        if self.store.len() >= self.quota {
            return Err(AccessError::QuotaExceeded(self.quota));
        }
        Ok(())
    }

    fn is_super_admin(&self, canonical: &str) -> bool {
        // Iterate all entries so the comparison count does not depend on
        // which entry matches.
        let mut found = false;
        for admin in &self.super_admins {
            if constant_time_eq(admin, canonical) {
                found = true;
            }
        }
        found
    }
}

/// Constant-time string equality (length check, then `subtle`).
fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryAccessStore;

    fn manager() -> AccessManager<MemoryAccessStore> {
        AccessManager::new(MemoryAccessStore::new(), vec![], 5)
    }

    #[test]
    fn issued_code_has_expected_shape() {
        let code = generate_code();
        assert!(code.starts_with(ACCESS_CODE_PREFIX));
        let suffix = &code[ACCESS_CODE_PREFIX.len()..];
        assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn request_then_activate_with_issued_code() {
        let mut mgr = manager();
        let code = mgr.request_code("081234567890@c.us").unwrap();

        mgr.activate("081234567890@c.us", Some(&code.0)).unwrap();
        assert_eq!(mgr.list(), vec!["081234567890"]);
        assert!(mgr.has_access("081234567890"));
    }

    #[test]
    fn both_dialing_forms_pass_after_activation() {
        let mut mgr = manager();
        let code = mgr.request_code("081234567890").unwrap();
        mgr.activate("081234567890", Some(&code.0)).unwrap();

        assert!(mgr.has_access("081234567890"));
        assert!(mgr.has_access("6281234567890"));
        assert!(mgr.has_access("6281234567890@c.us"));
    }

    #[test]
    fn malformed_code_fails_format_check_and_never_mutates() {
        let mut mgr = manager();
        mgr.request_code("081234567890").unwrap();

        let err = mgr.activate("081234567890", Some("WRONG-ABC123")).unwrap_err();
        assert!(matches!(err, AccessError::InvalidCodeFormat));
        assert!(mgr.list().is_empty());
    }

    #[test]
    fn well_formed_but_wrong_code_is_a_mismatch() {
        let mut mgr = manager();
        mgr.request_code("081234567890").unwrap();

        let err = mgr
            .activate("081234567890", Some("ACCESS-ZZZZZZ"))
            .unwrap_err();
        assert!(matches!(err, AccessError::CodeMismatch));
        assert!(mgr.list().is_empty());
    }

    #[test]
    fn activation_without_prior_request_is_a_mismatch() {
        let mut mgr = manager();
        let err = mgr
            .activate("081234567890", Some("ACCESS-ABC123"))
            .unwrap_err();
        assert!(matches!(err, AccessError::CodeMismatch));
    }

    #[test]
    fn missing_code_is_rejected_first() {
        let mut mgr = manager();
        assert!(matches!(
            mgr.activate("081234567890", None).unwrap_err(),
            AccessError::MissingCode
        ));
        assert!(matches!(
            mgr.activate("081234567890", Some("  ")).unwrap_err(),
            AccessError::MissingCode
        ));
    }

    #[test]
    fn repeat_request_replaces_the_pending_code() {
        let mut mgr = manager();
        let first = mgr.request_code("081234567890").unwrap();
        let second = mgr.request_code("081234567890").unwrap();

        let err = mgr.activate("081234567890", Some(&first.0));
        // The first code can only still work if the two draws collided.
        if first != second {
            assert!(matches!(err.unwrap_err(), AccessError::CodeMismatch));
        }
        mgr.activate("081234567890", Some(&second.0)).unwrap();
    }

    #[test]
    fn already_authorized_blocks_request_and_activation() {
        let mut mgr = manager();
        let code = mgr.request_code("081234567890").unwrap();
        mgr.activate("081234567890", Some(&code.0)).unwrap();

        assert!(matches!(
            mgr.request_code("081234567890").unwrap_err(),
            AccessError::AlreadyAuthorized
        ));
        // Alternate form counts as the same number.
        assert!(matches!(
            mgr.request_code("6281234567890").unwrap_err(),
            AccessError::AlreadyAuthorized
        ));
    }

    #[test]
    fn sixth_distinct_number_hits_the_quota() {
        let mut mgr = manager();
        for i in 0..5 {
            let number = format!("0812345678{i:02}");
            let code = mgr.request_code(&number).unwrap();
            mgr.activate(&number, Some(&code.0)).unwrap();
        }
        assert_eq!(mgr.list().len(), 5);

        let err = mgr.request_code("089999999999").unwrap_err();
        assert!(matches!(err, AccessError::QuotaExceeded(5)));
        let err = mgr.activate("089999999999", Some("ACCESS-ABC123")).unwrap_err();
        assert!(matches!(err, AccessError::QuotaExceeded(5)));
        assert_eq!(mgr.list().len(), 5);
    }

    #[test]
    fn revoke_absent_number_fails() {
        let mut mgr = manager();
        let err = mgr.revoke("081234567890").unwrap_err();
        assert!(matches!(err, AccessError::NotAuthorized));
    }

    #[test]
    fn revoke_accepts_either_dialing_form() {
        let mut mgr = manager();
        let code = mgr.request_code("081234567890").unwrap();
        mgr.activate("081234567890", Some(&code.0)).unwrap();

        mgr.revoke("6281234567890").unwrap();
        assert!(mgr.list().is_empty());
        assert!(!mgr.has_access("081234567890"));
    }

    #[test]
    fn revoked_number_can_request_again() {
        let mut mgr = manager();
        let code = mgr.request_code("081234567890").unwrap();
        mgr.activate("081234567890", Some(&code.0)).unwrap();
        mgr.revoke("081234567890").unwrap();

        assert!(mgr.request_code("081234567890").is_ok());
    }

    #[test]
    fn super_admin_bypasses_list_and_quota() {
        let mgr = AccessManager::new(
            MemoryAccessStore::new(),
            vec!["085764565028".into()],
            5,
        );
        assert!(mgr.has_access("085764565028"));
        assert!(mgr.has_access("6285764565028"));
        assert!(mgr.has_access("6285764565028@c.us"));
        assert!(mgr.list().is_empty());
    }

    #[test]
    fn super_admin_numbers_are_normalized_on_construction() {
        let mgr = AccessManager::new(
            MemoryAccessStore::new(),
            vec!["+62 857-6456-5028".into()],
            5,
        );
        assert!(mgr.has_access("085764565028"));
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut mgr = manager();
        for number in ["081111111111", "082222222222", "083333333333"] {
            let code = mgr.request_code(number).unwrap();
            mgr.activate(number, Some(&code.0)).unwrap();
        }
        assert_eq!(
            mgr.list(),
            vec!["081111111111", "082222222222", "083333333333"]
        );
    }
}
