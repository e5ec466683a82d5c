//! Identifiers used throughout ShareLedger.
//!
//! Every entity is keyed by the numeric id assigned by the surrounding
//! application's store. The newtypes keep participant, expense, and
//! settlement ids from being mixed up at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// Identity of a person taking part in shared expenses.
///
/// Owned by the external user directory; the engine only references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ExpenseId
// ---------------------------------------------------------------------------

/// Identifier of a shared expense record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expense:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SettlementId
// ---------------------------------------------------------------------------

/// Identifier of a persisted settlement payment row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct SettlementId(pub u64);

impl SettlementId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "settlement:{}", self.0)
    }
}

/// Ordered (debtor, creditor) pair. At most one PENDING settlement exists
/// per key.
pub type PairKey = (ParticipantId, ParticipantId);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        assert_eq!(ParticipantId(7).to_string(), "user:7");
        assert_eq!(ExpenseId(3).to_string(), "expense:3");
        assert_eq!(SettlementId(12).to_string(), "settlement:12");
    }

    #[test]
    fn settlement_id_next() {
        assert_eq!(SettlementId(5).next(), SettlementId(6));
    }

    #[test]
    fn participant_ids_order_numerically() {
        let mut ids = vec![ParticipantId(10), ParticipantId(2), ParticipantId(7)];
        ids.sort();
        assert_eq!(ids, vec![ParticipantId(2), ParticipantId(7), ParticipantId(10)]);
    }

    #[test]
    fn ids_serialize_transparently_as_numbers() {
        let json = serde_json::to_string(&ParticipantId(42)).unwrap();
        assert_eq!(json, "42");
        let back: ParticipantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ParticipantId(42));
    }
}
