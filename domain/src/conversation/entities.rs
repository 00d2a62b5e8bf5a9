//! Conversation domain entities

use crate::deliberation::record::DeliberationRecord;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Sync status of a locally created entity against the remote backend.
///
/// A provisional entity starts `Pending`. Remote confirmation moves it to
/// `Synced`; a failed remote call moves it to `Failed` so a retry affordance
/// can distinguish it. The entity itself is never discarded on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    #[default]
    Pending,
    Synced,
    Failed,
}

/// Metadata for a file attached to a user message.
///
/// The backend contract only accepts text content, so the attachment stays a
/// client-side annotation on the provisional message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Attachment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// A conversation summary as shown in the sidebar list (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: String,
    #[serde(default)]
    pub message_count: usize,
}

impl Conversation {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: created_at.into(),
            message_count: 0,
        }
    }
}

/// A message in a conversation timeline (Entity)
///
/// Immutable once committed. A provisional message carries a client-assigned
/// id which may be superseded by an authoritative id on confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliberation: Option<DeliberationRecord>,
    #[serde(default)]
    pub sync: SyncState,
}

impl Message {
    pub fn system(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::System,
            content: content.into(),
            attachment: None,
            deliberation: None,
            sync: SyncState::Synced,
        }
    }

    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            content: content.into(),
            attachment: None,
            deliberation: None,
            sync: SyncState::Synced,
        }
    }

    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: content.into(),
            attachment: None,
            deliberation: None,
            sync: SyncState::Synced,
        }
    }

    /// A locally created user message awaiting remote settlement
    pub fn provisional_user(id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::user(id, content);
        msg.sync = SyncState::Pending;
        msg
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_deliberation(mut self, record: DeliberationRecord) -> Self {
        self.deliberation = Some(record);
        self
    }

    /// Whether this message has a deliberation trace to open
    pub fn has_deliberation(&self) -> bool {
        self.deliberation.is_some()
    }
}
