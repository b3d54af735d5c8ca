use crate::core::amount;
use crate::core::party::ParticipantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Who a paid or owed share belongs to.
///
/// The store keeps payers and owers either as registered users or as
/// contact rows. Both resolve into the same balance-map key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AllocationRef {
    User(ParticipantId),
    Contact(ParticipantId),
}

impl AllocationRef {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(ParticipantId::new(id))
    }

    pub fn contact(id: impl Into<String>) -> Self {
        Self::Contact(ParticipantId::new(id))
    }

    /// The balance-map key this reference resolves to.
    pub fn id(&self) -> &ParticipantId {
        match self {
            Self::User(id) | Self::Contact(id) => id,
        }
    }
}

/// Errors arising from expense records.
#[derive(Debug, Error, PartialEq)]
pub enum ExpenseError {
    #[error("allocation of {amount} names neither a user nor a contact")]
    UnresolvedAllocation { amount: Decimal },
    #[error(
        "expense {expense_id} is unbalanced: amount {amount}, paid {paid}, split {split}"
    )]
    Unbalanced {
        expense_id: String,
        amount: Decimal,
        paid: Decimal,
        split: Decimal,
    },
    #[error("expense {expense_id} pays out {paid} but splits {split}")]
    SharesMismatch {
        expense_id: String,
        paid: Decimal,
        split: Decimal,
    },
}

/// One participant's paid or owed share of an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireAllocation", into = "WireAllocation")]
pub struct Allocation {
    pub reference: AllocationRef,
    pub amount: Decimal,
}

impl Allocation {
    pub fn new(reference: AllocationRef, amount: Decimal) -> Self {
        Self { reference, amount }
    }

    pub fn participant(&self) -> &ParticipantId {
        self.reference.id()
    }
}

/// Allocation as the store sends it: one of two optional id columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireAllocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contact_id: Option<String>,
    amount: Decimal,
}

impl TryFrom<WireAllocation> for Allocation {
    type Error = ExpenseError;

    fn try_from(wire: WireAllocation) -> Result<Self, Self::Error> {
        let non_empty = |id: Option<String>| id.filter(|s| !s.is_empty());
        // A user id takes precedence when both columns are filled.
        let reference = match (non_empty(wire.user_id), non_empty(wire.contact_id)) {
            (Some(user), _) => AllocationRef::user(user),
            (None, Some(contact)) => AllocationRef::contact(contact),
            (None, None) => {
                return Err(ExpenseError::UnresolvedAllocation {
                    amount: wire.amount,
                })
            }
        };
        Ok(Self::new(reference, wire.amount))
    }
}

impl From<Allocation> for WireAllocation {
    fn from(allocation: Allocation) -> Self {
        let (user_id, contact_id) = match allocation.reference {
            AllocationRef::User(id) => (Some(id.as_str().to_string()), None),
            AllocationRef::Contact(id) => (None, Some(id.as_str().to_string())),
        };
        Self {
            user_id,
            contact_id,
            amount: allocation.amount,
        }
    }
}

/// Deserializes an allocation list, dropping entries that name nobody.
mod allocations_serde {
    use super::*;
    use serde::Deserializer;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Allocation>, D::Error> {
        let wire = Vec::<WireAllocation>::deserialize(deserializer)?;
        let mut allocations = Vec::with_capacity(wire.len());
        for entry in wire {
            match Allocation::try_from(entry) {
                Ok(allocation) => allocations.push(allocation),
                Err(e) => log::warn!("skipping allocation: {}", e),
            }
        }
        Ok(allocations)
    }
}

/// A shared expense inside one event.
///
/// The paid and split totals are expected to match `amount`, but the
/// ledger does not rely on it; call [`Expense::validate`] to check.
///
/// # Examples
///
/// ```
/// use split_ledger::core::expense::{AllocationRef, Expense};
/// use rust_decimal_macros::dec;
///
/// let dinner = Expense::new("exp-1", "trip", dec!(100))
///     .paid_by(AllocationRef::user("alice"), dec!(100))
///     .split_between(AllocationRef::user("alice"), dec!(50))
///     .split_between(AllocationRef::contact("bob"), dec!(50));
///
/// assert!(dinner.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    id: String,
    event_id: String,
    amount: Decimal,
    #[serde(default, deserialize_with = "allocations_serde::deserialize")]
    paid_by: Vec<Allocation>,
    #[serde(default, deserialize_with = "allocations_serde::deserialize")]
    split_between: Vec<Allocation>,
}

impl Expense {
    pub fn new(id: impl Into<String>, event_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            amount,
            paid_by: Vec::new(),
            split_between: Vec::new(),
        }
    }

    /// Add a payer share.
    pub fn paid_by(mut self, reference: AllocationRef, amount: Decimal) -> Self {
        self.paid_by.push(Allocation::new(reference, amount));
        self
    }

    /// Add an owed share.
    pub fn split_between(mut self, reference: AllocationRef, amount: Decimal) -> Self {
        self.split_between.push(Allocation::new(reference, amount));
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn payers(&self) -> &[Allocation] {
        &self.paid_by
    }

    pub fn owers(&self) -> &[Allocation] {
        &self.split_between
    }

    pub fn paid_total(&self) -> Decimal {
        self.paid_by.iter().map(|a| a.amount).sum()
    }

    pub fn split_total(&self) -> Decimal {
        self.split_between.iter().map(|a| a.amount).sum()
    }

    /// Check that what was paid equals what was split, within one cent.
    ///
    /// This is the only property the ledger depends on; the `amount` header
    /// is not consulted.
    pub fn check_shares(&self) -> Result<(), ExpenseError> {
        let paid = self.paid_total();
        let split = self.split_total();
        if amount::approx_eq(paid, split) {
            Ok(())
        } else {
            Err(ExpenseError::SharesMismatch {
                expense_id: self.id.clone(),
                paid,
                split,
            })
        }
    }

    /// Stricter than [`Expense::check_shares`]: both the paid and the split
    /// shares must also add up to `amount` within one cent.
    pub fn validate(&self) -> Result<(), ExpenseError> {
        let paid = self.paid_total();
        let split = self.split_total();
        if amount::approx_eq(paid, self.amount) && amount::approx_eq(split, self.amount) {
            Ok(())
        } else {
            Err(ExpenseError::Unbalanced {
                expense_id: self.id.clone(),
                amount: self.amount,
                paid,
                split,
            })
        }
    }
}

/// Expenses grouped by the event they belong to, in input order.
#[derive(Debug, Clone, Default)]
pub struct ExpensesByEvent {
    groups: HashMap<String, Vec<Expense>>,
}

impl ExpensesByEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, expense: Expense) {
        self.groups
            .entry(expense.event_id.clone())
            .or_default()
            .push(expense);
    }

    /// Expenses of one event; empty when the event has none.
    pub fn for_event(&self, event_id: &str) -> &[Expense] {
        self.groups
            .get(event_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn event_count(&self) -> usize {
        self.groups.len()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<Expense> for ExpensesByEvent {
    fn from_iter<T: IntoIterator<Item = Expense>>(iter: T) -> Self {
        let mut grouped = Self::new();
        for expense in iter {
            grouped.add(expense);
        }
        grouped
    }
}
