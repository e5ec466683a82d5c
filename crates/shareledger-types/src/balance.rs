//! Net balance types produced by the balance calculator.
//!
//! A positive balance means the participant is owed money; a negative one
//! means they owe money. Balances are recomputed from scratch on every run
//! and never persisted.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ParticipantId;

/// Net position of every known participant for one computation.
///
/// Keyed by an ordered map so that iteration is by ascending participant id,
/// which the matcher relies on for deterministic tie-breaking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    balances: BTreeMap<ParticipantId, Decimal>,
    /// Σ(amount − share × split count) over all eligible expenses. Per-share
    /// rounding leaves this much unbalanced; the sheet total always equals it.
    residue: Decimal,
}

impl BalanceSheet {
    /// A sheet with a zero balance for each of `participants`.
    pub fn seeded(participants: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            balances: participants
                .into_iter()
                .map(|id| (id, Decimal::ZERO))
                .collect(),
            residue: Decimal::ZERO,
        }
    }

    /// Whether `participant` has an entry on this sheet.
    #[must_use]
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.balances.contains_key(&participant)
    }

    /// Balance of `participant`, zero if unknown.
    #[must_use]
    pub fn get(&self, participant: ParticipantId) -> Decimal {
        self.balances
            .get(&participant)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Add `delta` (possibly negative) to an existing entry.
    ///
    /// Returns `false` without changing anything if `participant` is not on
    /// the sheet.
    pub fn adjust(&mut self, participant: ParticipantId, delta: Decimal) -> bool {
        match self.balances.get_mut(&participant) {
            Some(balance) => {
                *balance += delta;
                true
            }
            None => false,
        }
    }

    /// Accumulate rounding residue left by an expense split.
    pub fn add_residue(&mut self, residue: Decimal) {
        self.residue += residue;
    }

    #[must_use]
    pub fn residue(&self) -> Decimal {
        self.residue
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.balances.values().copied().sum()
    }

    /// Whether every balance is exactly zero.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.balances.values().all(Decimal::is_zero)
    }

    /// Entries in ascending participant-id order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, Decimal)> + '_ {
        self.balances.iter().map(|(id, balance)| (*id, *balance))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl FromIterator<(ParticipantId, Decimal)> for BalanceSheet {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, Decimal)>>(iter: I) -> Self {
        Self {
            balances: iter.into_iter().collect(),
            residue: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sheet_is_zero() {
        let sheet = BalanceSheet::seeded([ParticipantId(1), ParticipantId(2)]);
        assert_eq!(sheet.len(), 2);
        assert!(sheet.is_settled());
        assert_eq!(sheet.total(), Decimal::ZERO);
    }

    #[test]
    fn adjust_unknown_is_rejected() {
        let mut sheet = BalanceSheet::seeded([ParticipantId(1)]);
        assert!(sheet.adjust(ParticipantId(1), Decimal::new(250, 2)));
        assert!(!sheet.adjust(ParticipantId(9), Decimal::ONE));
        assert_eq!(sheet.get(ParticipantId(1)), Decimal::new(250, 2));
        assert!(!sheet.contains(ParticipantId(9)));
    }

    #[test]
    fn iter_orders_by_id() {
        let sheet: BalanceSheet = [
            (ParticipantId(3), Decimal::ONE),
            (ParticipantId(1), Decimal::NEGATIVE_ONE),
        ]
        .into_iter()
        .collect();
        let ids: Vec<_> = sheet.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ParticipantId(1), ParticipantId(3)]);
        assert_eq!(sheet.total(), Decimal::ZERO);
    }
}
