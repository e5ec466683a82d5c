//! Randomised checks of the closed-system property: every debit has a
//! matching credit, up to per-share rounding residue.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use shareledger_balance::{compute_balances, match_balances};
use shareledger_types::*;

const PARTICIPANTS: u64 = 8;

fn random_ledger(rng: &mut StdRng, expenses: usize) -> Vec<SharedExpense> {
    let ids: Vec<u64> = (1..=PARTICIPANTS).collect();
    (0..expenses)
        .map(|i| {
            let payer = rng.gen_range(1..=PARTICIPANTS);
            let mut others: Vec<u64> = ids.iter().copied().filter(|id| *id != payer).collect();
            others.shuffle(rng);
            others.truncate(rng.gen_range(0..others.len()));
            let amount_cents = rng.gen_range(1..=500_000);
            SharedExpense::dummy(i as u64 + 1, amount_cents, payer, &others)
        })
        .collect()
}

fn participants() -> Vec<Participant> {
    (1..=PARTICIPANTS)
        .map(|id| Participant::new(id, format!("p{id}")))
        .collect()
}

/// Largest residue one expense can leave: half a cent per sharer.
fn residue_bound(expenses: &[SharedExpense]) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.split_count() > 1)
        .map(|e| Decimal::new(5, 3) * Decimal::from(e.split_count()))
        .sum()
}

#[test]
fn balances_sum_to_residue() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..200 {
        let count = rng.gen_range(0..25);
        let expenses = random_ledger(&mut rng, count);
        let sheet = compute_balances(&participants(), &expenses, &[], 2).unwrap();

        assert_eq!(sheet.total(), sheet.residue(), "round {round}");
        assert!(
            sheet.residue().abs() <= residue_bound(&expenses),
            "round {round}: residue {} exceeds bound {}",
            sheet.residue(),
            residue_bound(&expenses)
        );
    }
}

#[test]
fn matching_nets_balances_to_residue() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..200 {
        let count = rng.gen_range(1..25);
        let expenses = random_ledger(&mut rng, count);
        let sheet = compute_balances(&participants(), &expenses, &[], 2).unwrap();
        let suggestions = match_balances(&sheet);

        let mut after = sheet.clone();
        for s in &suggestions {
            assert!(s.amount > Decimal::ZERO, "round {round}");
            assert!(sheet.get(s.from) < Decimal::ZERO, "round {round}: payer must be a debtor");
            assert!(sheet.get(s.to) > Decimal::ZERO, "round {round}: payee must be a creditor");
            after.adjust(s.from, s.amount);
            after.adjust(s.to, -s.amount);
        }

        // Either every creditor or every debtor is fully cleared; what remains
        // is the rounding residue.
        let leftover: Decimal = after.iter().map(|(_, b)| b.abs()).sum();
        assert_eq!(leftover, sheet.residue().abs(), "round {round}");
        assert!(
            after
                .iter()
                .all(|(id, b)| b.is_zero() || b.is_sign_negative() == sheet.get(id).is_sign_negative()),
            "round {round}: no balance may flip sign"
        );
    }
}

#[test]
fn paying_suggestions_settles_the_ledger() {
    let mut rng = StdRng::seed_from_u64(7);
    let expenses = random_ledger(&mut rng, 30);
    let sheet = compute_balances(&participants(), &expenses, &[], 2).unwrap();

    let paid: Vec<SettlementPayment> = match_balances(&sheet)
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let mut payment = SettlementPayment::dummy(i as u64 + 1, s.from.0, s.to.0, 0, SettlementState::Paid);
            payment.amount = s.amount;
            payment
        })
        .collect();

    let settled = compute_balances(&participants(), &expenses, &paid, 2).unwrap();
    let leftover: Decimal = settled.iter().map(|(_, b)| b.abs()).sum();
    assert_eq!(leftover, sheet.residue().abs());
    assert!(match_balances(&settled)
        .iter()
        .all(|s| s.amount <= sheet.residue().abs()));
}
