//! Conversation store — sole owner of the conversation list and the
//! per-conversation timeline caches.
//!
//! All mutations go through this type (or through the send pipeline, which
//! borrows it); every other component consumes read-only snapshots. The
//! backing list is versioned so consumers can cheaply detect staleness.
//!
//! Optimistic discipline: locally created entries are inserted immediately
//! and reconciled when the remote confirms. A failed remote create marks the
//! entry unsynced instead of erasing it — the user's action stays
//! discoverable. A delete removes locally first and is idempotent.

use council_domain::{Conversation, Message, SyncState};
use std::collections::HashMap;
use tracing::debug;

/// Default title for a freshly created conversation
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Immutable, versioned view of the conversation list (newest first)
#[derive(Debug, Clone)]
pub struct ConversationListSnapshot {
    pub version: u64,
    pub conversations: Vec<Conversation>,
}

/// Owner of the conversation list, timeline caches, and active selection
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    sync: HashMap<String, SyncState>,
    timelines: HashMap<String, Vec<Message>>,
    active: Option<String>,
    version: u64,
    next_seq: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic version of the backing list; bumped on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    /// Allocate a client-side id. Millisecond timestamp plus a sequence
    /// number keeps ids unique even within one tick.
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_seq += 1;
        format!(
            "{}_{}_{}",
            prefix,
            chrono::Utc::now().timestamp_millis(),
            self.next_seq
        )
    }

    /// Allocate a provisional message id
    pub fn allocate_message_id(&mut self) -> String {
        self.allocate_id("temp")
    }

    // -- Conversation list --

    /// Cloned, versioned snapshot for consumers outside the state engine
    pub fn snapshot(&self) -> ConversationListSnapshot {
        ConversationListSnapshot {
            version: self.version,
            conversations: self.conversations.clone(),
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.conversations.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Replace the list with a remote refresh.
    ///
    /// Locally created entries the remote does not know yet (create pending
    /// or failed) are kept at the head: the remote list cannot contain them,
    /// and erasing them would lose user actions.
    pub fn set_conversations(&mut self, remote: Vec<Conversation>) {
        let unsynced: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|c| {
                matches!(
                    self.sync.get(&c.id),
                    Some(SyncState::Failed) | Some(SyncState::Pending)
                )
            })
            .cloned()
            .collect();

        self.sync
            .retain(|id, _| unsynced.iter().any(|c| &c.id == id));
        for conv in &remote {
            self.sync.insert(conv.id.clone(), SyncState::Synced);
        }

        self.conversations = unsynced;
        self.conversations.extend(remote);
        self.bump();
    }

    /// Synchronously insert a provisional conversation at the head and
    /// select it. Returns a clone of the new entry.
    pub fn create_provisional(&mut self) -> Conversation {
        let id = self.allocate_id("conv_temp");
        let conv = Conversation::new(id.clone(), DEFAULT_TITLE, chrono::Utc::now().to_rfc3339());

        self.conversations.insert(0, conv.clone());
        self.sync.insert(id.clone(), SyncState::Pending);
        self.timelines.insert(id.clone(), Vec::new());
        self.active = Some(id);
        self.bump();
        conv
    }

    /// Reconcile a provisional entry with the authoritative record.
    ///
    /// The entry is replaced in place — never duplicated — and the timeline
    /// cache and active selection follow the id change. Messages sent while
    /// the create was in flight keep their local count.
    pub fn confirm_created(&mut self, provisional_id: &str, authoritative: Conversation) -> bool {
        let Some(pos) = self
            .conversations
            .iter()
            .position(|c| c.id == provisional_id)
        else {
            // Deleted while the create was in flight; nothing to reconcile
            debug!(provisional_id, "provisional conversation gone before confirmation");
            return false;
        };

        let local_count = self.conversations[pos].message_count;
        let new_id = authoritative.id.clone();

        self.conversations[pos] = authoritative;
        self.conversations[pos].message_count = self.conversations[pos].message_count.max(local_count);

        if let Some(timeline) = self.timelines.remove(provisional_id) {
            self.timelines.insert(new_id.clone(), timeline);
        }
        if self.active.as_deref() == Some(provisional_id) {
            self.active = Some(new_id.clone());
        }
        self.sync.remove(provisional_id);
        self.sync.insert(new_id, SyncState::Synced);
        self.bump();
        true
    }

    /// Mark a locally created entry as unsynced after a failed remote create
    pub fn mark_unsynced(&mut self, id: &str) {
        if self.contains(id) {
            self.sync.insert(id.to_string(), SyncState::Failed);
            self.bump();
        }
    }

    /// Sync status of a conversation, if known
    pub fn sync_state(&self, id: &str) -> Option<SyncState> {
        self.sync.get(id).copied()
    }

    /// Remove a conversation. Optimistic and idempotent: returns `false`
    /// once the id is locally absent. Removing the active conversation
    /// clears the active selection and its timeline cache.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return false;
        }

        self.timelines.remove(id);
        self.sync.remove(id);
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.bump();
        true
    }

    // -- Active selection --

    /// Select a conversation; `false` when the id is unknown
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    // -- Timelines --

    pub fn has_timeline(&self, id: &str) -> bool {
        self.timelines.contains_key(id)
    }

    /// Cache a timeline fetched from the remote side
    pub fn cache_timeline(&mut self, id: &str, messages: Vec<Message>) {
        if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) {
            conv.message_count = messages.len();
        }
        self.timelines.insert(id.to_string(), messages);
        self.bump();
    }

    pub fn timeline(&self, id: &str) -> Option<&[Message]> {
        self.timelines.get(id).map(|t| t.as_slice())
    }

    /// Timeline of the active conversation; empty when none is selected
    pub fn active_timeline(&self) -> &[Message] {
        self.active
            .as_deref()
            .and_then(|id| self.timelines.get(id))
            .map(|t| t.as_slice())
            .unwrap_or(&[])
    }

    /// Append a message to a conversation's timeline (append-only; order is
    /// intent order). Returns `false` when the conversation is gone.
    pub fn append_message(&mut self, conversation_id: &str, message: Message) -> bool {
        let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        else {
            debug!(conversation_id, "dropping message for removed conversation");
            return false;
        };
        conv.message_count += 1;

        self.timelines
            .entry(conversation_id.to_string())
            .or_default()
            .push(message);
        self.bump();
        true
    }

    /// Update the sync state of one message in place
    pub fn mark_message_sync(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        sync: SyncState,
    ) -> bool {
        let Some(msg) = self
            .timelines
            .get_mut(conversation_id)
            .and_then(|t| t.iter_mut().find(|m| m.id == message_id))
        else {
            return false;
        };
        msg.sync = sync;
        self.bump();
        true
    }

}
