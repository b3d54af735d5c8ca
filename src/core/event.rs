use crate::core::currency::CurrencyCode;
use crate::core::party::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};

/// A group of participants sharing expenses in a single currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Event {
    pub fn new(id: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            id: id.into(),
            currency,
            participants: Vec::new(),
        }
    }

    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    /// Ids of the formally listed participants, in listing order.
    pub fn participant_ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants.iter().map(|p| &p.id)
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn is_listed(&self, id: &ParticipantId) -> bool {
        self.participant(id).is_some()
    }
}
