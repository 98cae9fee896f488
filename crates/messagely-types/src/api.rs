use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Message, UserSummary};

// -- Caller --

/// The identity an operation runs on behalf of.
///
/// Built by the authentication layer once credentials have been checked;
/// nothing in this workspace verifies it again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller {
    username: String,
}

impl Caller {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is(&self, username: &str) -> bool {
        self.username == username
    }
}

// -- Messages --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub to_username: String,
    pub body: String,
}

/// Full view of a message, returned only to its sender or recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDetail {
    pub id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

/// A message in the recipient's inbox, annotated with the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxEntry {
    pub id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub from_user: UserSummary,
}

/// A message in the sender's outbox, annotated with the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub to_user: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadReceipt {
    pub id: Uuid,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<&Message> for ReadReceipt {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            read_at: message.read_at,
        }
    }
}
