use crate::core::event::Event;
use crate::core::expense::{Expense, ExpensesByEvent};
use crate::core::party::SessionIdentity;
use serde::{Deserialize, Serialize};

/// Everything the engine needs for one computation: the session user plus
/// the current events and expenses fetched from the store.
///
/// Snapshots are read-only; every query recomputes from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub session: SessionIdentity,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    pub fn new(session: SessionIdentity) -> Self {
        Self {
            session,
            events: Vec::new(),
            expenses: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn expenses_by_event(&self) -> ExpensesByEvent {
        self.expenses.iter().cloned().collect()
    }
}
