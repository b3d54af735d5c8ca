//! Per-user exposure across events.
//!
//! Every query runs the ledger and the settlement solver for each event in
//! isolation, then reads off the transactions that touch the session user.
//! Amounts are bucketed by event currency and never converted.

use crate::core::currency::CurrencyCode;
use crate::core::event::Event;
use crate::core::expense::{Expense, ExpenseError, ExpensesByEvent};
use crate::core::ledger::{compute_balances, Ledger};
use crate::core::party::{resolve_session_participant, ParticipantId, SessionIdentity};
use crate::optimization::settlement::{SettlementError, SettlementSolver, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors arising while computing an event's settlement.
#[derive(Debug, Error, PartialEq)]
pub enum ExposureError {
    #[error("event {event_id}: {source}")]
    Expense {
        event_id: String,
        source: ExpenseError,
    },
    #[error("event {event_id}: {source}")]
    Settlement {
        event_id: String,
        source: SettlementError,
    },
}

impl ExposureError {
    pub fn event_id(&self) -> &str {
        match self {
            Self::Expense { event_id, .. } | Self::Settlement { event_id, .. } => event_id,
        }
    }
}

/// Ledger and settling transactions of one event, seen from the session user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSettlement {
    pub event_id: String,
    pub currency: CurrencyCode,
    /// Balance-map key standing for the session user in this event.
    pub session_participant: ParticipantId,
    pub ledger: Ledger,
    pub transactions: Vec<Transaction>,
}

impl EventSettlement {
    /// Transactions where the session user pays.
    pub fn outgoing(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.from == self.session_participant)
    }

    /// Transactions where the session user gets paid.
    pub fn incoming(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.to == self.session_participant)
    }
}

/// What the session user owes and is owed, per currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyExposure {
    pub owe_by_currency: BTreeMap<CurrencyCode, Decimal>,
    pub owed_by_currency: BTreeMap<CurrencyCode, Decimal>,
}

impl CurrencyExposure {
    pub fn owe(&self, currency: &CurrencyCode) -> Decimal {
        self.owe_by_currency
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn owed(&self, currency: &CurrencyCode) -> Decimal {
        self.owed_by_currency
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.owe_by_currency.is_empty() && self.owed_by_currency.is_empty()
    }

    fn record(&mut self, settlement: &EventSettlement) {
        for tx in settlement.outgoing() {
            *self
                .owe_by_currency
                .entry(settlement.currency.clone())
                .or_insert(Decimal::ZERO) += tx.amount;
        }
        for tx in settlement.incoming() {
            *self
                .owed_by_currency
                .entry(settlement.currency.clone())
                .or_insert(Decimal::ZERO) += tx.amount;
        }
    }
}

impl fmt::Display for CurrencyExposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Exposure ===")?;
        writeln!(f, "You owe:")?;
        for (currency, amount) in &self.owe_by_currency {
            writeln!(f, "  {}: {}", currency, amount)?;
        }
        writeln!(f, "Owed to you:")?;
        for (currency, amount) in &self.owed_by_currency {
            writeln!(f, "  {}: {}", currency, amount)?;
        }
        Ok(())
    }
}

/// Exposure over the events that settled, plus the errors of those that
/// did not.
#[derive(Debug, Default, PartialEq)]
pub struct ExposureReport {
    pub exposure: CurrencyExposure,
    pub failed: Vec<ExposureError>,
}

impl ExposureReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Which way money flows between the session user and a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// The session user pays the contact.
    YouOwe,
    /// The contact pays the session user.
    TheyOwe,
}

/// The direct settling payment between the session user and one contact
/// inside one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseRecord {
    pub event_id: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub direction: Direction,
}

/// Runs ledger and settlement per event and aggregates the results for
/// the session user.
pub struct ExposureAggregator;

impl ExposureAggregator {
    /// Ids seeded into an event's ledger: the listed participants followed
    /// by the session user's own id, even when the session user is not listed.
    pub fn known_participants(event: &Event, session: &SessionIdentity) -> Vec<ParticipantId> {
        let mut known: Vec<ParticipantId> = event.participant_ids().cloned().collect();
        if !known.contains(&session.id) {
            known.push(session.id.clone());
        }
        known
    }

    /// Balances and settling transactions for a single event.
    ///
    /// Every expense must pay out what it splits; the first one that does
    /// not aborts the computation for this event. The `amount` header of an
    /// expense is not checked.
    pub fn event_settlement(
        event: &Event,
        expenses: &[Expense],
        session: &SessionIdentity,
    ) -> Result<EventSettlement, ExposureError> {
        for expense in expenses {
            expense.check_shares().map_err(|source| ExposureError::Expense {
                event_id: event.id.clone(),
                source,
            })?;
        }

        let session_participant = resolve_session_participant(&event.participants, session);
        let ledger = compute_balances(Self::known_participants(event, session), expenses);
        let transactions =
            SettlementSolver::settle(&ledger).map_err(|source| ExposureError::Settlement {
                event_id: event.id.clone(),
                source,
            })?;

        log::debug!(
            "event {}: {} participant(s), {} expense(s), {} transaction(s)",
            event.id,
            ledger.len(),
            expenses.len(),
            transactions.len()
        );

        Ok(EventSettlement {
            event_id: event.id.clone(),
            currency: event.currency.clone(),
            session_participant: session_participant.id().clone(),
            ledger,
            transactions,
        })
    }

    /// Total owed and owing for the session user across all events.
    ///
    /// Fails with the first event that cannot be settled. Use
    /// [`ExposureAggregator::exposure_report`] to keep the totals of the
    /// events that did settle.
    pub fn aggregate_exposure(
        events: &[Event],
        expenses: &ExpensesByEvent,
        session: &SessionIdentity,
    ) -> Result<CurrencyExposure, ExposureError> {
        let report = Self::exposure_report(events, expenses, session);
        match report.failed.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(report.exposure),
        }
    }

    /// Like [`ExposureAggregator::aggregate_exposure`], but an event that
    /// cannot be settled is set aside instead of failing the whole rollup.
    pub fn exposure_report(
        events: &[Event],
        expenses: &ExpensesByEvent,
        session: &SessionIdentity,
    ) -> ExposureReport {
        let mut report = ExposureReport::default();
        for event in events {
            match Self::event_settlement(event, expenses.for_event(&event.id), session) {
                Ok(settlement) => report.exposure.record(&settlement),
                Err(err) => {
                    log::debug!("leaving event {} out of exposure: {}", event.id, err);
                    report.failed.push(err);
                }
            }
        }
        report
    }

    /// Per-event direct payments between the session user and `contact`.
    ///
    /// Events where the settlement does not route a payment between the two
    /// are left out, even if both carry balances against others.
    pub fn pairwise_exposure(
        events: &[Event],
        expenses: &ExpensesByEvent,
        session: &SessionIdentity,
        contact: &ParticipantId,
    ) -> Result<Vec<PairwiseRecord>, ExposureError> {
        let mut records = Vec::new();
        for event in events {
            let settlement =
                Self::event_settlement(event, expenses.for_event(&event.id), session)?;
            let me = &settlement.session_participant;
            if me == contact {
                continue;
            }

            let direct = settlement.transactions.iter().find_map(|tx| {
                if &tx.from == contact && &tx.to == me {
                    Some((tx.amount, Direction::TheyOwe))
                } else if &tx.from == me && &tx.to == contact {
                    Some((tx.amount, Direction::YouOwe))
                } else {
                    None
                }
            });

            if let Some((amount, direction)) = direct {
                records.push(PairwiseRecord {
                    event_id: event.id.clone(),
                    amount,
                    currency: event.currency.clone(),
                    direction,
                });
            }
        }
        Ok(records)
    }
}
