//! Per-conversation send state machine: `Idle → Sending → {Settled | Failed}`.
//!
//! `begin` appends the provisional user message synchronously, so the user
//! sees their input immediately regardless of remote latency. The remote
//! council call happens between `begin` and `settle`/`fail`, driven by the
//! session controller. At most one send may be in flight per conversation;
//! distinct conversations are independent resources and may interleave.

use crate::ports::council_gateway::CouncilReply;
use crate::store::conversation_store::ConversationStore;
use council_domain::{Attachment, DeliberationRecord, Message, SyncState};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Send status of one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    Sending,
    Settled,
    Failed,
}

/// Precondition violations on `begin`; contract errors, not remote failures
#[derive(Error, Debug)]
pub enum SendError {
    #[error("A send is already in flight for conversation {0}")]
    AlreadySending(String),

    #[error("Empty message: content or attachment is required")]
    EmptyMessage,
}

/// State machine driving optimistic sends and their reconciliation
#[derive(Debug, Default)]
pub struct MessageSendPipeline {
    states: HashMap<String, SendState>,
}

impl MessageSendPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, conversation_id: &str) -> SendState {
        self.states
            .get(conversation_id)
            .copied()
            .unwrap_or_default()
    }

    /// Whether `begin` would currently be rejected for this conversation
    pub fn is_sending(&self, conversation_id: &str) -> bool {
        self.state(conversation_id) == SendState::Sending
    }

    /// Start a send: validate preconditions and synchronously append the
    /// provisional user message. Returns the provisional message id.
    ///
    /// Rejected while a send is in flight for the same conversation — the
    /// caller must await settle/fail first. Re-entry from `Settled` or
    /// `Failed` is permitted (retry).
    pub fn begin(
        &mut self,
        store: &mut ConversationStore,
        conversation_id: &str,
        content: &str,
        attachment: Option<Attachment>,
    ) -> Result<String, SendError> {
        if content.trim().is_empty() && attachment.is_none() {
            return Err(SendError::EmptyMessage);
        }
        if self.is_sending(conversation_id) {
            return Err(SendError::AlreadySending(conversation_id.to_string()));
        }

        let message_id = store.allocate_message_id();
        let mut message = Message::provisional_user(&message_id, content);
        if let Some(attachment) = attachment {
            message = message.with_attachment(attachment);
        }
        store.append_message(conversation_id, message);

        self.states
            .insert(conversation_id.to_string(), SendState::Sending);
        debug!(conversation_id, message_id, "send started");
        Ok(message_id)
    }

    /// Reconcile a settled reply: mark the provisional message synced and
    /// append one assistant message carrying the normalized deliberation.
    ///
    /// Returns the assistant message id.
    pub fn settle(
        &mut self,
        store: &mut ConversationStore,
        conversation_id: &str,
        provisional_id: &str,
        reply: CouncilReply,
    ) -> String {
        store.mark_message_sync(conversation_id, provisional_id, SyncState::Synced);

        let record = DeliberationRecord::normalize(reply.deliberation);
        let assistant_id = store.allocate_message_id();
        let assistant =
            Message::assistant(&assistant_id, reply.response).with_deliberation(record);
        store.append_message(conversation_id, assistant);

        self.states
            .insert(conversation_id.to_string(), SendState::Settled);
        debug!(conversation_id, assistant_id, "send settled");
        assistant_id
    }

    /// Record a failed send. The provisional user message stays in its slot
    /// (input is never silently discarded), flagged failed so a retry
    /// affordance can pick it up.
    pub fn fail(
        &mut self,
        store: &mut ConversationStore,
        conversation_id: &str,
        provisional_id: &str,
    ) {
        store.mark_message_sync(conversation_id, provisional_id, SyncState::Failed);
        self.states
            .insert(conversation_id.to_string(), SendState::Failed);
        warn!(conversation_id, provisional_id, "send failed");
    }
}
