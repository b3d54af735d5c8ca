use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of the balance map.
///
/// Registered users and stand-in contacts share one id space: an expense
/// allocation that names a user and one that names a contact both resolve
/// to a `ParticipantId`, and the ledger never needs to know which it was.
///
/// # Examples
///
/// ```
/// use split_ledger::core::party::ParticipantId;
///
/// let alice = ParticipantId::new("user-alice");
/// let bob = ParticipantId::new("contact-bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A member of an event as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// The signed-in user, passed explicitly into every computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: ParticipantId,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl SessionIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Participant record used when the session user is not listed in an event.
    pub fn to_participant(&self) -> Participant {
        let name = if self.name.trim().is_empty() {
            "You".to_string()
        } else {
            self.name.clone()
        };
        Participant {
            id: self.id.clone(),
            name,
            email: Some(self.email.clone()),
        }
    }
}

/// Where the session participant of an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    /// A listed participant whose email matches the session email.
    Formal,
    /// Synthesized from the session identity.
    Virtual,
}

/// The participant standing for the session user within one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParticipant {
    pub participant: Participant,
    pub source: SessionSource,
}

impl SessionParticipant {
    pub fn id(&self) -> &ParticipantId {
        &self.participant.id
    }

    pub fn is_virtual(&self) -> bool {
        self.source == SessionSource::Virtual
    }
}

/// Resolve the session user against an event's participant list.
///
/// Precedence: a listed participant whose email equals the session email,
/// then a virtual participant built from the session identity.
pub fn resolve_session_participant(
    participants: &[Participant],
    session: &SessionIdentity,
) -> SessionParticipant {
    let formal = participants
        .iter()
        .find(|p| p.email.as_deref() == Some(session.email.as_str()));

    match formal {
        Some(participant) => SessionParticipant {
            participant: participant.clone(),
            source: SessionSource::Formal,
        },
        None => SessionParticipant {
            participant: session.to_participant(),
            source: SessionSource::Virtual,
        },
    }
}

/// Participant list with the session user included exactly once.
///
/// A virtual session participant is placed first; when the session user is
/// already listed the list is returned unchanged.
pub fn merge_session_participant(
    participants: &[Participant],
    session: &SessionIdentity,
) -> Vec<Participant> {
    let resolved = resolve_session_participant(participants, session);
    let mut merged = Vec::with_capacity(participants.len() + 1);
    if resolved.is_virtual() {
        merged.push(resolved.participant);
    }
    merged.extend(participants.iter().cloned());
    merged
}
