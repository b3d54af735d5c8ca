use crate::core::amount;
use crate::core::expense::Expense;
use crate::core::party::ParticipantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Net balance of every participant within one event.
///
/// A positive balance means the participant is owed money (creditor).
/// A negative balance means the participant owes money (debtor).
///
/// Balances keep the order in which participants were first seen: known
/// participants in the order they were seeded, then any id that only shows
/// up inside an expense allocation. Settlement tie-breaks follow this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    #[serde(with = "balances_serde")]
    balances: Balances,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Balances {
    entries: Vec<(ParticipantId, Decimal)>,
    index: HashMap<ParticipantId, usize>,
}

impl Balances {
    fn slot(&mut self, id: &ParticipantId) -> &mut Decimal {
        let idx = match self.index.get(id) {
            Some(&idx) => idx,
            None => {
                self.entries.push((id.clone(), Decimal::ZERO));
                let idx = self.entries.len() - 1;
                self.index.insert(id.clone(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }
}

mod balances_serde {
    use super::*;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;

    pub fn serialize<S: serde::Serializer>(
        balances: &Balances,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(balances.entries.len()))?;
        for (id, amount) in &balances.entries {
            map.serialize_entry(id, amount)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Balances, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Balances;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of participant id to balance")
            }
            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut balances = Balances::default();
                while let Some((id, value)) = access.next_entry::<ParticipantId, Decimal>()? {
                    *balances.slot(&id) = value;
                }
                Ok(balances)
            }
        }
        deserializer.deserialize_map(V)
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with a zero balance for every known participant.
    pub fn with_participants<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        let mut ledger = Self::new();
        for id in ids {
            ledger.add_participant(&id);
        }
        ledger
    }

    /// Make sure `id` has an entry; an existing balance is left untouched.
    pub fn add_participant(&mut self, id: &ParticipantId) {
        self.balances.slot(id);
    }

    /// Apply an expense: payers gain what they paid, owers lose their share.
    ///
    /// Ids the ledger has not seen yet are added on the fly rather than
    /// dropped, so a participant removed from an event still settles.
    pub fn apply_expense(&mut self, expense: &Expense) {
        for share in expense.payers() {
            self.adjust(share.participant(), share.amount, expense);
        }
        for share in expense.owers() {
            self.adjust(share.participant(), -share.amount, expense);
        }
    }

    fn adjust(&mut self, id: &ParticipantId, delta: Decimal, expense: &Expense) {
        if !self.contains(id) {
            log::debug!(
                "expense {} references unlisted participant {}",
                expense.id(),
                id
            );
        }
        *self.balances.slot(id) += delta;
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.balances.index.contains_key(id)
    }

    /// Net balance of a participant; zero for unknown ids.
    pub fn balance(&self, id: &ParticipantId) -> Decimal {
        self.balances
            .index
            .get(id)
            .map(|&idx| self.balances.entries[idx].1)
            .unwrap_or(Decimal::ZERO)
    }

    /// All balances in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, Decimal)> {
        self.balances.entries.iter().map(|(id, amount)| (id, *amount))
    }

    pub fn len(&self) -> usize {
        self.balances.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.entries.is_empty()
    }

    /// Sum of all balances. Zero whenever every expense is balanced.
    pub fn total(&self) -> Decimal {
        self.balances.entries.iter().map(|(_, amount)| *amount).sum()
    }

    /// The balances sum to zero within tolerance.
    pub fn is_balanced(&self) -> bool {
        amount::is_negligible(self.total())
    }

    /// Sum of positive balances: the amount that has to change hands.
    pub fn total_owed(&self) -> Decimal {
        self.balances
            .entries
            .iter()
            .map(|(_, amount)| *amount)
            .filter(|amount| *amount > Decimal::ZERO)
            .sum()
    }
}

impl FromIterator<(ParticipantId, Decimal)> for Ledger {
    /// Build a ledger from precomputed balances; repeated ids accumulate.
    fn from_iter<T: IntoIterator<Item = (ParticipantId, Decimal)>>(iter: T) -> Self {
        let mut ledger = Self::new();
        for (id, amount) in iter {
            *ledger.balances.slot(&id) += amount;
        }
        ledger
    }
}

/// Compute net balances for one event.
///
/// Every id in `known` starts at zero, including ones no expense touches.
pub fn compute_balances<I>(known: I, expenses: &[Expense]) -> Ledger
where
    I: IntoIterator<Item = ParticipantId>,
{
    let mut ledger = Ledger::with_participants(known);
    for expense in expenses {
        ledger.apply_expense(expense);
    }
    ledger
}
