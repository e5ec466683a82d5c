//! Participants and shared expenses, the read-only input of the engine.
//!
//! Expenses are created and edited by the surrounding expense-management
//! code. The engine only reads them, and only those whose lifecycle status
//! makes them eligible for settlement.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ExpenseId, LedgerError, ParticipantId, Result};

/// A known identity from the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
}

impl Participant {
    #[must_use]
    pub fn new(id: u64, display_name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId(id),
            display_name: display_name.into(),
        }
    }
}

/// Lifecycle status of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    /// Submitted, awaiting approval. Still counts toward settlements.
    Pending,
    /// Approved by the business.
    Approved,
    /// Paid back by the business; no longer owed between participants.
    Reimbursed,
    /// Rejected; never counted.
    Rejected,
}

impl ExpenseStatus {
    /// Whether an expense in this status contributes to balances.
    #[must_use]
    pub fn is_settlement_eligible(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Reimbursed => write!(f, "REIMBURSED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// An expense paid by one participant and split evenly with others.
///
/// `split_participants` never contains the payer, so the number of people
/// sharing the cost is always `split_participants.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedExpense {
    pub id: ExpenseId,
    /// Total paid, strictly positive.
    pub amount: Decimal,
    /// Who paid the full amount up front.
    pub payer: ParticipantId,
    /// Everyone else sharing the cost.
    pub split_participants: BTreeSet<ParticipantId>,
    pub status: ExpenseStatus,
}

impl SharedExpense {
    /// Build a validated shared expense.
    ///
    /// # Errors
    /// - [`LedgerError::NonPositiveAmount`] if `amount <= 0`
    /// - [`LedgerError::Validation`] if the payer is listed among the split
    ///   participants or a split participant appears twice
    pub fn new(
        id: ExpenseId,
        amount: Decimal,
        payer: ParticipantId,
        split_participants: impl IntoIterator<Item = ParticipantId>,
        status: ExpenseStatus,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }

        let mut splits = BTreeSet::new();
        for participant in split_participants {
            if participant == payer {
                return Err(LedgerError::Validation {
                    reason: format!("{id}: payer {payer} cannot also be a split participant"),
                });
            }
            if !splits.insert(participant) {
                return Err(LedgerError::Validation {
                    reason: format!("{id}: duplicate split participant {participant}"),
                });
            }
        }

        Ok(Self {
            id,
            amount,
            payer,
            split_participants: splits,
            status,
        })
    }

    /// Number of people sharing the cost, payer included.
    #[must_use]
    pub fn split_count(&self) -> usize {
        self.split_participants.len() + 1
    }

    /// Whether this expense contributes to balances.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.status.is_settlement_eligible()
    }

    /// Payer followed by every split participant.
    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        std::iter::once(self.payer).chain(self.split_participants.iter().copied())
    }
}

/// Test shorthand. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl SharedExpense {
    /// An approved expense with `amount_cents` split between `payer` and `splits`.
    pub fn dummy(id: u64, amount_cents: i64, payer: u64, splits: &[u64]) -> Self {
        Self::new(
            ExpenseId(id),
            Decimal::new(amount_cents, 2),
            ParticipantId(payer),
            splits.iter().copied().map(ParticipantId),
            ExpenseStatus::Approved,
        )
        .expect("dummy expense must be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligible_statuses() {
        assert!(ExpenseStatus::Pending.is_settlement_eligible());
        assert!(ExpenseStatus::Approved.is_settlement_eligible());
        assert!(!ExpenseStatus::Reimbursed.is_settlement_eligible());
        assert!(!ExpenseStatus::Rejected.is_settlement_eligible());
    }

    #[test]
    fn split_count_includes_payer() {
        let expense = SharedExpense::dummy(1, 10_000, 1, &[2, 3]);
        assert_eq!(expense.split_count(), 3);

        let solo = SharedExpense::dummy(2, 10_000, 1, &[]);
        assert_eq!(solo.split_count(), 1);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let err = SharedExpense::new(
            ExpenseId(1),
            Decimal::ZERO,
            ParticipantId(1),
            [ParticipantId(2)],
            ExpenseStatus::Approved,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::NonPositiveAmount(_)));
    }

    #[test]
    fn rejects_payer_in_split() {
        let err = SharedExpense::new(
            ExpenseId(1),
            Decimal::ONE,
            ParticipantId(1),
            [ParticipantId(1), ParticipantId(2)],
            ExpenseStatus::Approved,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
    }

    #[test]
    fn rejects_duplicate_split_participant() {
        let err = SharedExpense::new(
            ExpenseId(1),
            Decimal::ONE,
            ParticipantId(1),
            [ParticipantId(2), ParticipantId(2)],
            ExpenseStatus::Pending,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { reason } if reason.contains("duplicate")));
    }

    #[test]
    fn participants_lists_payer_first() {
        let expense = SharedExpense::dummy(1, 900, 5, &[3, 9]);
        let all: Vec<_> = expense.participants().collect();
        assert_eq!(all, vec![ParticipantId(5), ParticipantId(3), ParticipantId(9)]);
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&ExpenseStatus::Approved).unwrap();
        assert_eq!(json, "\"APPROVED\"");
    }
}
