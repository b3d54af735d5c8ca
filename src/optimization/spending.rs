use crate::core::amount;
use crate::core::currency::CurrencyCode;
use crate::core::event::Event;
use crate::core::expense::Expense;
use crate::core::ledger::compute_balances;
use crate::core::party::{
    merge_session_participant, resolve_session_participant, ParticipantId, SessionIdentity,
};
use crate::optimization::exposure::ExposureAggregator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How much one participant paid out across an event's expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSpend {
    pub id: ParticipantId,
    pub name: String,
    pub amount: Decimal,
}

/// Totals view of one event for the session user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub event_id: String,
    pub currency: CurrencyCode,
    /// What the session user still owes, from their net balance.
    pub you_owe: Decimal,
    /// What the session user is still owed, from their net balance.
    pub owed_to_you: Decimal,
    /// Participants who paid anything, biggest spender first.
    pub spent: Vec<ParticipantSpend>,
}

impl SpendingSummary {
    /// Build the totals view of `event`.
    ///
    /// Only listed participants and the session user are counted as
    /// spenders; payments by anyone else still move balances but are not
    /// listed.
    pub fn for_event(event: &Event, expenses: &[Expense], session: &SessionIdentity) -> Self {
        let me = resolve_session_participant(&event.participants, session);
        let known = ExposureAggregator::known_participants(event, session);
        let ledger = compute_balances(known, expenses);

        let balance = ledger.balance(me.id());
        let you_owe = if amount::is_debit(balance) {
            -balance
        } else {
            Decimal::ZERO
        };
        let owed_to_you = if amount::is_credit(balance) {
            balance
        } else {
            Decimal::ZERO
        };

        let people = merge_session_participant(&event.participants, session);
        let mut paid: HashMap<&ParticipantId, Decimal> =
            people.iter().map(|p| (&p.id, Decimal::ZERO)).collect();
        for expense in expenses {
            for share in expense.payers() {
                if let Some(total) = paid.get_mut(share.participant()) {
                    *total += share.amount;
                }
            }
        }

        let mut spent: Vec<ParticipantSpend> = Vec::new();
        for person in &people {
            let amount = paid.get(&person.id).copied().unwrap_or(Decimal::ZERO);
            if amount > Decimal::ZERO && !spent.iter().any(|s| s.id == person.id) {
                spent.push(ParticipantSpend {
                    id: person.id.clone(),
                    name: person.name.clone(),
                    amount,
                });
            }
        }
        spent.sort_by(|a, b| b.amount.cmp(&a.amount));

        Self {
            event_id: event.id.clone(),
            currency: event.currency.clone(),
            you_owe,
            owed_to_you,
            spent,
        }
    }

    /// Total paid by everyone listed.
    pub fn total_spent(&self) -> Decimal {
        self.spent.iter().map(|s| s.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expense::AllocationRef;
    use crate::core::party::Participant;
    use rust_decimal_macros::dec;

    fn trip() -> Event {
        Event::new("trip", CurrencyCode::new("UAH"))
            .with_participant(Participant::new("bob", "Bob"))
            .with_participant(Participant::new("cat", "Cat"))
    }

    #[test]
    fn test_spenders_sorted_and_named() {
        let session = SessionIdentity::new("me", "Olena", "me@example.com");
        let expenses = vec![
            Expense::new("x1", "trip", dec!(30))
                .paid_by(AllocationRef::contact("bob"), dec!(30))
                .split_between(AllocationRef::user("me"), dec!(30)),
            Expense::new("x2", "trip", dec!(90))
                .paid_by(AllocationRef::user("me"), dec!(90))
                .split_between(AllocationRef::contact("bob"), dec!(45))
                .split_between(AllocationRef::contact("cat"), dec!(45)),
            Expense::new("x3", "trip", dec!(10))
                .paid_by(AllocationRef::contact("stranger"), dec!(10))
                .split_between(AllocationRef::contact("cat"), dec!(10)),
        ];

        let summary = SpendingSummary::for_event(&trip(), &expenses, &session);

        let names: Vec<&str> = summary.spent.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Olena", "Bob"]);
        assert_eq!(summary.total_spent(), dec!(120));
        // me: +90 - 30 = +60
        assert_eq!(summary.owed_to_you, dec!(60));
        assert_eq!(summary.you_owe, Decimal::ZERO);
    }

    #[test]
    fn test_session_debt() {
        let session = SessionIdentity::new("me", "", "me@example.com");
        let expenses = vec![Expense::new("x1", "trip", dec!(12))
            .paid_by(AllocationRef::contact("cat"), dec!(12))
            .split_between(AllocationRef::user("me"), dec!(6))
            .split_between(AllocationRef::contact("cat"), dec!(6))];

        let summary = SpendingSummary::for_event(&trip(), &expenses, &session);
        assert_eq!(summary.you_owe, dec!(6));
        assert_eq!(summary.owed_to_you, Decimal::ZERO);
        assert_eq!(summary.spent.len(), 1);
        assert_eq!(summary.spent[0].name, "Cat");
    }

    #[test]
    fn test_no_expenses() {
        let session = SessionIdentity::new("me", "Me", "me@example.com");
        let summary = SpendingSummary::for_event(&trip(), &[], &session);
        assert!(summary.spent.is_empty());
        assert_eq!(summary.you_owe, Decimal::ZERO);
    }
}
