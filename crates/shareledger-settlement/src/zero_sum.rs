//! Zero-sum invariant checker.
//!
//! Invariant enforced on every computed balance sheet:
//! ```text
//! Σ balance(p) == residue
//! |residue|    <= Σ over eligible split expenses of n × ½ × 10^-scale
//! ```
//!
//! Each shared expense is a closed transfer: whoever paid is credited what
//! the others are debited. Only per-share rounding may leave anything over,
//! and each share can be off by at most half a unit in the last place.
//! Anything beyond that means the ledger snapshot or the calculator is
//! broken, and the recomputation is aborted before it writes.

use rust_decimal::Decimal;
use shareledger_types::{BalanceSheet, LedgerError, Result, SharedExpense};

/// Validates a [`BalanceSheet`] against the expenses it was computed from.
#[derive(Debug, Clone, Copy)]
pub struct ZeroSumCheck {
    scale: u32,
}

impl ZeroSumCheck {
    #[must_use]
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    /// Largest residue the given expenses can legitimately leave.
    #[must_use]
    pub fn residue_bound(&self, expenses: &[SharedExpense]) -> Decimal {
        let half_unit = Decimal::new(5, self.scale + 1);
        expenses
            .iter()
            .filter(|e| e.is_eligible() && e.split_count() > 1)
            .map(|e| half_unit * Decimal::from(e.split_count()))
            .sum()
    }

    /// # Errors
    /// Returns [`LedgerError::ZeroSumViolation`] if the sheet total differs
    /// from its recorded residue, or the residue exceeds the rounding bound.
    pub fn verify(&self, sheet: &BalanceSheet, expenses: &[SharedExpense]) -> Result<()> {
        let total = sheet.total();
        let residue = sheet.residue();
        if total != residue {
            return Err(LedgerError::ZeroSumViolation {
                reason: format!("balances sum to {total} but rounding residue is {residue}"),
            });
        }

        let bound = self.residue_bound(expenses);
        if residue.abs() > bound {
            return Err(LedgerError::ZeroSumViolation {
                reason: format!("rounding residue {residue} exceeds bound {bound}"),
            });
        }

        if !residue.is_zero() {
            tracing::warn!(
                residue = %residue,
                bound = %bound,
                "Balances carry rounding residue; it is left unsettled"
            );
        }
        Ok(())
    }
}

impl Default for ZeroSumCheck {
    fn default() -> Self {
        Self::new(shareledger_types::constants::SHARE_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use shareledger_types::{ExpenseStatus, ParticipantId};

    use super::*;

    #[test]
    fn empty_sheet_passes() {
        assert!(ZeroSumCheck::default().verify(&BalanceSheet::default(), &[]).is_ok());
    }

    #[test]
    fn bound_is_half_cent_per_sharer() {
        let expenses = [
            SharedExpense::dummy(1, 10_000, 1, &[2, 3]),
            SharedExpense::dummy(2, 10_000, 1, &[]),
        ];
        assert_eq!(
            ZeroSumCheck::default().residue_bound(&expenses),
            Decimal::new(15, 3)
        );
    }

    #[test]
    fn ineligible_expenses_add_no_bound() {
        let mut rejected = SharedExpense::dummy(1, 10_000, 1, &[2, 3]);
        rejected.status = ExpenseStatus::Rejected;
        assert_eq!(ZeroSumCheck::default().residue_bound(&[rejected]), Decimal::ZERO);
    }

    #[test]
    fn unbalanced_sheet_fails() {
        let sheet: BalanceSheet = [
            (ParticipantId(1), Decimal::new(100, 0)),
            (ParticipantId(2), Decimal::new(-90, 0)),
        ]
        .into_iter()
        .collect();
        let err = ZeroSumCheck::default().verify(&sheet, &[]).unwrap_err();
        assert!(matches!(err, LedgerError::ZeroSumViolation { .. }));
    }

    #[test]
    fn residue_beyond_bound_fails() {
        let mut sheet = BalanceSheet::seeded([ParticipantId(1)]);
        sheet.adjust(ParticipantId(1), Decimal::new(5, 2));
        sheet.add_residue(Decimal::new(5, 2));
        let expenses = [SharedExpense::dummy(1, 100, 1, &[2])];
        let err = ZeroSumCheck::default().verify(&sheet, &expenses).unwrap_err();
        assert!(format!("{err}").contains("exceeds bound"));
    }
}
