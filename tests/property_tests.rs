use proptest::prelude::*;
use rust_decimal::Decimal;
use split_ledger::core::amount::{is_negligible, TOLERANCE};
use split_ledger::core::expense::{AllocationRef, Expense};
use split_ledger::core::ledger::{compute_balances, Ledger};
use split_ledger::core::party::ParticipantId;
use split_ledger::optimization::settlement::SettlementSolver;

const PEOPLE: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Random reference into a small pool, as a user or as a contact.
fn arb_ref() -> impl Strategy<Value = AllocationRef> {
    (0..PEOPLE.len(), any::<bool>()).prop_map(|(i, as_user)| {
        if as_user {
            AllocationRef::user(PEOPLE[i])
        } else {
            AllocationRef::contact(PEOPLE[i])
        }
    })
}

/// Random per-person share in whole currency units, 1 to 10,000.
fn arb_share() -> impl Strategy<Value = i64> {
    1i64..10_000i64
}

/// A balanced expense: one payer, split evenly between 1..=6 owers.
///
/// Shares are whole units so no balance lands on the one-cent boundary,
/// where the solver treats a participant as already settled.
fn arb_expense() -> impl Strategy<Value = Expense> {
    (arb_ref(), prop::collection::vec(arb_ref(), 1..=6), arb_share()).prop_map(
        |(payer, owers, share)| {
            let total = Decimal::from(share * owers.len() as i64);
            owers.into_iter().fold(
                Expense::new("x", "ev", total).paid_by(payer, total),
                |expense, ower| expense.split_between(ower, Decimal::from(share)),
            )
        },
    )
}

fn arb_expenses() -> impl Strategy<Value = Vec<Expense>> {
    prop::collection::vec(arb_expense(), 0..30)
}

fn known() -> Vec<ParticipantId> {
    PEOPLE[..4].iter().map(|s| ParticipantId::new(*s)).collect()
}

fn arb_ledger() -> impl Strategy<Value = Ledger> {
    arb_expenses().prop_map(|expenses| compute_balances(known(), &expenses))
}

/// Zero-sum ledger in cents where some balances sit within one cent of zero.
///
/// The last participant absorbs whatever the others leave, so the total is
/// always exactly zero.
fn arb_boundary_ledger() -> impl Strategy<Value = Ledger> {
    let cents = prop_oneof![-1i64..=1i64, -100_000i64..=100_000i64];
    prop::collection::vec(cents, 1..8).prop_map(|cents| {
        let sink = -cents.iter().sum::<i64>();
        cents
            .into_iter()
            .chain(std::iter::once(sink))
            .enumerate()
            .map(|(i, c)| (ParticipantId::new(format!("p{}", i)), Decimal::new(c, 2)))
            .collect()
    })
}

proptest! {
    // Balanced expenses always produce balances that sum to zero.
    #[test]
    fn balances_sum_to_zero(expenses in arb_expenses()) {
        prop_assert!(expenses.iter().all(|e| e.validate().is_ok()));
        let ledger = compute_balances(known(), &expenses);
        prop_assert!(
            is_negligible(ledger.total()),
            "balances sum to {}",
            ledger.total()
        );
    }

    // Every non-zero balance is cleared exactly by the transactions touching it.
    #[test]
    fn settlement_clears_every_balance(ledger in arb_ledger()) {
        let txs = SettlementSolver::settle(&ledger).unwrap();
        for (id, balance) in ledger.iter() {
            let settled: Decimal = txs.iter().map(|t| t.effect_on(id)).sum();
            prop_assert!(
                (balance + settled).abs() < TOLERANCE,
                "{} has balance {} but transactions move {}",
                id,
                balance,
                settled
            );
        }
    }

    // Identical inputs give identical outputs.
    #[test]
    fn computation_is_idempotent(expenses in arb_expenses()) {
        let first = compute_balances(known(), &expenses);
        let second = compute_balances(known(), &expenses);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            SettlementSolver::settle(&first).unwrap(),
            SettlementSolver::settle(&second).unwrap()
        );
    }

    // Settled participants never show up in a transaction.
    #[test]
    fn settled_participants_untouched(ledger in arb_ledger()) {
        let txs = SettlementSolver::settle(&ledger).unwrap();
        for (id, balance) in ledger.iter() {
            if balance.abs() <= TOLERANCE {
                prop_assert!(txs.iter().all(|t| !t.involves(id)));
            }
        }
    }

    // Balances in [-0.01, +0.01] stay out of every transaction.
    #[test]
    fn boundary_balances_untouched(ledger in arb_boundary_ledger()) {
        let txs = SettlementSolver::settle(&ledger).unwrap();
        for (id, balance) in ledger.iter() {
            if balance.abs() <= TOLERANCE {
                prop_assert!(
                    txs.iter().all(|t| !t.involves(id)),
                    "{} at {} appears in a transaction",
                    id,
                    balance
                );
            }
        }
    }

    // Every transaction moves a positive amount between distinct participants,
    // and there are fewer transactions than participants with a balance.
    #[test]
    fn transactions_are_well_formed(ledger in arb_ledger()) {
        let txs = SettlementSolver::settle(&ledger).unwrap();
        let open = ledger.iter().filter(|(_, b)| !is_negligible(*b)).count();
        prop_assert!(txs.len() < open.max(1));
        for t in &txs {
            prop_assert!(t.amount > Decimal::ZERO);
            prop_assert_ne!(&t.from, &t.to);
        }
    }

    // Any residual from an unbalanced ledger is reported, never dropped.
    #[test]
    fn residual_is_reported(ledger in arb_ledger(), skew in 2i64..100_000i64) {
        let mut skewed: Vec<(ParticipantId, Decimal)> =
            ledger.iter().map(|(id, b)| (id.clone(), b)).collect();
        skewed.push((ParticipantId::new("extra"), Decimal::new(skew, 2)));
        let skewed: Ledger = skewed.into_iter().collect();

        prop_assert!(SettlementSolver::settle(&skewed).is_err());
        let plan = SettlementSolver::greedy_match(&skewed);
        let residual: Decimal = plan.unmatched.iter().map(|(_, r)| *r).sum();
        prop_assert!((residual - Decimal::new(skew, 2)).abs() < TOLERANCE);
    }
}
