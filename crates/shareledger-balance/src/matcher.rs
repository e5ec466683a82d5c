//! Greedy settlement matcher.
//!
//! Turns a balance sheet into debtor → creditor transfers:
//!
//! ```text
//! match_balances(BalanceSheet) -> Vec<SettlementSuggestion>
//! ```
//!
//! ## Algorithm
//!
//! 1. Split participants into creditors (balance > 0) and debtors (< 0)
//! 2. Creditors by balance descending, debtors by balance ascending (most
//!    indebted first); equal balances keep ascending participant-id order
//! 3. For each creditor, walk the debtors and move
//!    `min(remaining credit, remaining debt)` until the credit is exhausted
//!
//! Largest-first greedy: it always nets the sheet (up to rounding residue)
//! but does not minimise the number of transfers. Any residue is left
//! unsettled rather than forced to zero.

use rust_decimal::Decimal;
use shareledger_types::{BalanceSheet, ParticipantId, SettlementSuggestion};

/// Produce the ordered transfers that clear `sheet`.
///
/// Every suggestion has a strictly positive amount. The same sheet always
/// produces the same list.
#[must_use]
pub fn match_balances(sheet: &BalanceSheet) -> Vec<SettlementSuggestion> {
    // `sheet.iter()` is in ascending id order; stable sorts keep it for ties.
    let mut creditors: Vec<(ParticipantId, Decimal)> =
        sheet.iter().filter(|(_, b)| *b > Decimal::ZERO).collect();
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut debtors: Vec<(ParticipantId, Decimal)> =
        sheet.iter().filter(|(_, b)| *b < Decimal::ZERO).collect();
    debtors.sort_by(|a, b| a.1.cmp(&b.1));

    let mut suggestions = Vec::new();

    for (creditor, credit) in creditors {
        let mut remaining = credit;

        for (debtor, balance) in &mut debtors {
            if remaining <= Decimal::ZERO {
                break;
            }

            let transfer = remaining.min(-*balance);
            if transfer > Decimal::ZERO {
                tracing::debug!(
                    from = %debtor,
                    to = %creditor,
                    amount = %transfer,
                    "Settlement matched"
                );
                suggestions.push(SettlementSuggestion::new(*debtor, creditor, transfer));
                remaining -= transfer;
                *balance += transfer;
            }
        }

        if remaining > Decimal::ZERO {
            tracing::debug!(
                creditor = %creditor,
                unsettled = %remaining,
                "Credit left unmatched"
            );
        }
    }

    let unmatched_debt: Decimal = debtors.iter().map(|(_, b)| -*b).sum();
    tracing::debug!(
        transfers = suggestions.len(),
        unmatched_debt = %unmatched_debt,
        "Matching complete"
    );

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(entries: &[(u64, i64)]) -> BalanceSheet {
        entries
            .iter()
            .map(|(id, v)| (ParticipantId(*id), Decimal::new(*v, 0)))
            .collect()
    }

    fn suggestion(from: u64, to: u64, amount: i64) -> SettlementSuggestion {
        SettlementSuggestion::new(ParticipantId(from), ParticipantId(to), Decimal::new(amount, 0))
    }

    #[test]
    fn settled_sheet_produces_nothing() {
        assert!(match_balances(&sheet(&[(1, 0), (2, 0)])).is_empty());
        assert!(match_balances(&BalanceSheet::default()).is_empty());
    }

    #[test]
    fn one_creditor_two_debtors() {
        // A: +100, B: -60, C: -40
        let result = match_balances(&sheet(&[(1, 100), (2, -60), (3, -40)]));
        assert_eq!(result, vec![suggestion(2, 1, 60), suggestion(3, 1, 40)]);
        let received: Decimal = result.iter().map(|s| s.amount).sum();
        assert_eq!(received, Decimal::new(100, 0));
    }

    #[test]
    fn creditors_sorted_descending() {
        // A: +50, B: +30, C: -80
        let result = match_balances(&sheet(&[(1, 50), (2, 30), (3, -80)]));
        assert_eq!(result, vec![suggestion(3, 1, 50), suggestion(3, 2, 30)]);
    }

    #[test]
    fn largest_debtor_pays_first() {
        let result = match_balances(&sheet(&[(1, 70), (2, -20), (3, -50)]));
        assert_eq!(result, vec![suggestion(3, 1, 50), suggestion(2, 1, 20)]);
    }

    #[test]
    fn debtor_split_across_creditors() {
        let result = match_balances(&sheet(&[(1, 40), (2, 40), (3, -50), (4, -30)]));
        assert_eq!(
            result,
            vec![
                suggestion(3, 1, 40),
                suggestion(3, 2, 10),
                suggestion(4, 2, 30),
            ]
        );
    }

    #[test]
    fn equal_balances_break_ties_by_id() {
        let result = match_balances(&sheet(&[(9, 10), (4, 10), (7, -10), (2, -10)]));
        assert_eq!(result, vec![suggestion(2, 4, 10), suggestion(7, 9, 10)]);
    }

    #[test]
    fn residual_credit_left_unsettled() {
        let residue = BalanceSheet::from_iter([
            (ParticipantId(1), Decimal::new(6_667, 2)),
            (ParticipantId(2), Decimal::new(-3_333, 2)),
            (ParticipantId(3), Decimal::new(-3_333, 2)),
        ]);
        let result = match_balances(&residue);
        assert_eq!(result.len(), 2);
        let paid: Decimal = result.iter().map(|s| s.amount).sum();
        assert_eq!(paid, Decimal::new(6_666, 2));
    }

    #[test]
    fn amounts_are_strictly_positive() {
        let result = match_balances(&sheet(&[(1, 5), (2, 0), (3, -5), (4, 3), (5, -3)]));
        assert!(result.iter().all(|s| s.amount > Decimal::ZERO));
        assert!(result.iter().all(|s| s.from != s.to));
    }

    #[test]
    fn output_is_deterministic() {
        let input = sheet(&[(1, 33), (2, -11), (3, 12), (4, -34)]);
        assert_eq!(match_balances(&input), match_balances(&input));
    }
}
