//! Balance calculator: ledger snapshot → net balance per participant.
//!
//! ```text
//! for each eligible expense e with n = split count:
//!     share            = round_half_up(e.amount / n, scale)
//!     balance(payer)  += e.amount − share
//!     balance(split)  −= share            (for every split participant)
//! for each PAID settlement s:
//!     balance(s.from) −= s.amount
//!     balance(s.to)   += s.amount
//! ```
//!
//! Shares are rounded individually and the remainder is **not**
//! redistributed, so a sheet can carry a few cents of residue per expense.
//! The residue is tracked on the [`BalanceSheet`] so the total remains
//! exactly checkable.

use rust_decimal::{Decimal, RoundingStrategy};
use shareledger_types::{
    BalanceSheet, LedgerError, Participant, ParticipantId, Result, SettlementPayment,
    SettlementState, SharedExpense,
};

/// Compute every participant's net balance from a ledger snapshot.
///
/// Ineligible expenses (REIMBURSED, REJECTED) and settlements in any state
/// other than PAID are skipped. An expense with nobody to split with
/// contributes nothing.
///
/// # Errors
/// Returns [`LedgerError::InvalidReference`] if an eligible expense or a PAID
/// settlement names a participant outside `participants`. Nothing is
/// partially returned.
pub fn compute_balances(
    participants: &[Participant],
    expenses: &[SharedExpense],
    settlements: &[SettlementPayment],
    scale: u32,
) -> Result<BalanceSheet> {
    let mut sheet = BalanceSheet::seeded(participants.iter().map(|p| p.id));
    let mut applied = 0usize;

    for expense in expenses.iter().filter(|e| e.is_eligible()) {
        for participant in expense.participants() {
            require_known(&sheet, participant, || format!("{}", expense.id))?;
        }

        let split_count = expense.split_count();
        if split_count <= 1 {
            continue;
        }

        let share = (expense.amount / Decimal::from(split_count))
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);

        sheet.adjust(expense.payer, expense.amount - share);
        for participant in &expense.split_participants {
            sheet.adjust(*participant, -share);
        }

        let residue = expense.amount - share * Decimal::from(split_count);
        if !residue.is_zero() {
            tracing::debug!(
                expense = %expense.id,
                amount = %expense.amount,
                share = %share,
                residue = %residue,
                "Rounding residue left by split"
            );
            sheet.add_residue(residue);
        }
        applied += 1;
    }

    let mut offsets = 0usize;
    for payment in settlements
        .iter()
        .filter(|s| s.state == SettlementState::Paid)
    {
        let context = || match payment.id {
            Some(id) => format!("{id}"),
            None => "unsaved settlement".to_string(),
        };
        require_known(&sheet, payment.from, context)?;
        require_known(&sheet, payment.to, context)?;

        // Money moved from debtor to creditor: both move toward zero.
        sheet.adjust(payment.from, payment.amount);
        sheet.adjust(payment.to, -payment.amount);
        offsets += 1;
    }

    tracing::debug!(
        participants = sheet.len(),
        expenses = applied,
        paid_offsets = offsets,
        residue = %sheet.residue(),
        "Balances computed"
    );

    Ok(sheet)
}

fn require_known(
    sheet: &BalanceSheet,
    participant: ParticipantId,
    context: impl FnOnce() -> String,
) -> Result<()> {
    if sheet.contains(participant) {
        Ok(())
    } else {
        Err(LedgerError::InvalidReference {
            participant,
            context: context(),
        })
    }
}
