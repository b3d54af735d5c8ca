//! Greedy debt settlement.
//!
//! Turns a balance map into a short list of payments that brings every
//! participant back to zero.
//!
//! # Algorithm
//!
//! 1. Split participants into creditors (`> +0.01`) and debtors (`< -0.01`).
//! 2. Sort both by absolute amount, largest first. Equal amounts keep
//!    ledger order.
//! 3. Walk both lists with two pointers: the current debtor pays the current
//!    creditor `min(owed, due)`, and whichever side drops below one cent
//!    moves on.
//!
//! The result is near-minimal, not guaranteed minimal.

use crate::core::amount::{self, TOLERANCE};
use crate::core::ledger::Ledger;
use crate::core::party::ParticipantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A suggested payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Decimal,
}

impl Transaction {
    pub fn involves(&self, id: &ParticipantId) -> bool {
        &self.from == id || &self.to == id
    }

    /// Signed effect on `id`'s balance once paid: the payer's debt shrinks
    /// (positive), the payee's claim shrinks (negative).
    pub fn effect_on(&self, id: &ParticipantId) -> Decimal {
        if &self.from == id {
            self.amount
        } else if &self.to == id {
            -self.amount
        } else {
            Decimal::ZERO
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.from, self.to, self.amount)
    }
}

/// Errors arising from settlement.
#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    #[error(
        "balances sum to {imbalance} instead of zero; {} participant(s) left unmatched",
        .unmatched.len()
    )]
    Unbalanced {
        imbalance: Decimal,
        unmatched: Vec<(ParticipantId, Decimal)>,
    },
}

/// Outcome of one greedy pass, including whatever could not be matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub transactions: Vec<Transaction>,
    /// Remaining signed balances the pass could not clear. Empty when the
    /// input balances summed to zero.
    pub unmatched: Vec<(ParticipantId, Decimal)>,
}

impl SettlementPlan {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

struct Position {
    id: ParticipantId,
    remaining: Decimal,
}

/// Converts balances into settling transactions.
pub struct SettlementSolver;

impl SettlementSolver {
    /// Settle an event's balances.
    ///
    /// Fails instead of returning a partial plan when the balances do not
    /// sum to zero, which only happens if some expense was unbalanced.
    /// Leftovers from participants sitting exactly on the one-cent boundary
    /// are not an error.
    pub fn settle(ledger: &Ledger) -> Result<Vec<Transaction>, SettlementError> {
        let plan = Self::greedy_match(ledger);
        let imbalance = ledger.total();
        if !amount::is_negligible(imbalance) {
            return Err(SettlementError::Unbalanced {
                imbalance,
                unmatched: plan.unmatched,
            });
        }
        Ok(plan.transactions)
    }

    /// Run the greedy pass without checking the zero-sum precondition.
    ///
    /// Any residual is reported in [`SettlementPlan::unmatched`] instead of
    /// being silently dropped.
    pub fn greedy_match(ledger: &Ledger) -> SettlementPlan {
        let mut creditors = Vec::new();
        let mut debtors = Vec::new();
        for (id, balance) in ledger.iter() {
            if amount::is_credit(balance) {
                creditors.push(Position {
                    id: id.clone(),
                    remaining: balance,
                });
            } else if amount::is_debit(balance) {
                debtors.push(Position {
                    id: id.clone(),
                    remaining: -balance,
                });
            }
        }

        // Stable sorts: ties stay in ledger order.
        creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        let mut transactions = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < debtors.len() && j < creditors.len() {
            let debtor = &mut debtors[i];
            let creditor = &mut creditors[j];
            let amount = debtor.remaining.min(creditor.remaining);
            if amount > Decimal::ZERO {
                transactions.push(Transaction {
                    from: debtor.id.clone(),
                    to: creditor.id.clone(),
                    amount,
                });
                debtor.remaining -= amount;
                creditor.remaining -= amount;
            }
            if debtor.remaining < TOLERANCE {
                i += 1;
            }
            if creditor.remaining < TOLERANCE {
                j += 1;
            }
        }

        let mut unmatched: Vec<(ParticipantId, Decimal)> = debtors[i..]
            .iter()
            .map(|d| (d.id.clone(), -d.remaining))
            .collect();
        unmatched.extend(creditors[j..].iter().map(|c| (c.id.clone(), c.remaining)));

        if !unmatched.is_empty() {
            log::warn!(
                "settlement left {} participant(s) unmatched, imbalance {}",
                unmatched.len(),
                ledger.total()
            );
        }

        SettlementPlan {
            transactions,
            unmatched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ledger(entries: &[(&str, Decimal)]) -> Ledger {
        entries
            .iter()
            .map(|(id, amount)| (ParticipantId::new(*id), *amount))
            .collect()
    }

    fn tx(from: &str, to: &str, amount: Decimal) -> Transaction {
        Transaction {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    #[test]
    fn test_simple_pair() {
        let balances = ledger(&[("a", dec!(50)), ("b", dec!(-50))]);
        let txs = SettlementSolver::settle(&balances).unwrap();
        assert_eq!(txs, vec![tx("b", "a", dec!(50))]);
    }

    #[test]
    fn test_largest_first_matching() {
        // A: +70, B: +30, C: -60, D: -40
        let balances = ledger(&[
            ("a", dec!(70)),
            ("b", dec!(30)),
            ("c", dec!(-60)),
            ("d", dec!(-40)),
        ]);
        let txs = SettlementSolver::settle(&balances).unwrap();
        assert_eq!(
            txs,
            vec![
                tx("c", "a", dec!(60)),
                tx("d", "a", dec!(10)),
                tx("d", "b", dec!(30)),
            ]
        );
    }

    #[test]
    fn test_ties_follow_ledger_order() {
        let balances = ledger(&[("a", dec!(60)), ("c", dec!(-30)), ("b", dec!(-30))]);
        let txs = SettlementSolver::settle(&balances).unwrap();
        assert_eq!(txs, vec![tx("c", "a", dec!(30)), tx("b", "a", dec!(30))]);
    }

    #[test]
    fn test_near_zero_balances_skipped() {
        let balances = ledger(&[
            ("a", dec!(10.005)),
            ("b", dec!(-10)),
            ("c", dec!(-0.005)),
        ]);
        let plan = SettlementSolver::greedy_match(&balances);
        assert_eq!(plan.transactions, vec![tx("b", "a", dec!(10))]);
        assert!(plan.transactions.iter().all(|t| !t.involves(&"c".into())));
        assert!(plan.is_complete());
    }

    #[test]
    fn test_boundary_cent_is_not_an_error() {
        // C sits exactly on the boundary and is treated as settled, so one
        // cent of A's claim stays open.
        let balances = ledger(&[
            ("a", dec!(1.01)),
            ("b", dec!(-1.00)),
            ("c", dec!(-0.01)),
        ]);
        let plan = SettlementSolver::greedy_match(&balances);
        assert_eq!(plan.unmatched, vec![(ParticipantId::new("a"), dec!(0.01))]);

        let txs = SettlementSolver::settle(&balances).unwrap();
        assert_eq!(txs, vec![tx("b", "a", dec!(1.00))]);
    }

    #[test]
    fn test_empty_ledger() {
        let txs = SettlementSolver::settle(&Ledger::new()).unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn test_unbalanced_input_reports_residual() {
        let balances = ledger(&[("a", dec!(100)), ("b", dec!(-60))]);

        let plan = SettlementSolver::greedy_match(&balances);
        assert_eq!(plan.transactions, vec![tx("b", "a", dec!(60))]);
        assert_eq!(plan.unmatched, vec![(ParticipantId::new("a"), dec!(40))]);

        let err = SettlementSolver::settle(&balances).unwrap_err();
        assert_eq!(
            err,
            SettlementError::Unbalanced {
                imbalance: dec!(40),
                unmatched: vec![(ParticipantId::new("a"), dec!(40))],
            }
        );
    }

    #[test]
    fn test_transaction_effect() {
        let t = tx("b", "a", dec!(5));
        assert_eq!(t.effect_on(&"b".into()), dec!(5));
        assert_eq!(t.effect_on(&"a".into()), dec!(-5));
        assert_eq!(t.effect_on(&"z".into()), Decimal::ZERO);
        assert_eq!(t.to_string(), "b pays a 5");
    }
}
