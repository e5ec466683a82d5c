//! Fingerprint of a settlement plan.
//!
//! Two recomputations over the same ledger snapshot must yield the same
//! suggestions in the same order. The digest is logged with every
//! reconciliation so that drift is visible without diffing full payloads.

use sha2::{Digest, Sha256};
use shareledger_types::SettlementSuggestion;

/// SHA-256 over the ordered suggestions.
///
/// `H(domain_sep || count || for each: from || to || amount)`
#[must_use]
pub fn plan_digest(suggestions: &[SettlementSuggestion]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"shareledger:plan:v1:");
    hasher.update((suggestions.len() as u64).to_le_bytes());

    for suggestion in suggestions {
        hasher.update(suggestion.from.0.to_le_bytes());
        hasher.update(suggestion.to.0.to_le_bytes());
        // Normalise so 60 and 60.00 hash alike.
        hasher.update(suggestion.amount.normalize().to_string().as_bytes());
    }

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Recompute the digest of `suggestions` and compare with `expected`.
#[must_use]
pub fn verify_plan_digest(suggestions: &[SettlementSuggestion], expected: &[u8; 32]) -> bool {
    plan_digest(suggestions) == *expected
}
