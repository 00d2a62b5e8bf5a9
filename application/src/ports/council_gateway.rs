//! Council gateway port
//!
//! Defines the interface for communicating with the remote council backend.
//! Transport mechanics (retry, backoff, auth, wire format) are the adapter's
//! concern; this layer contracts only the operation shapes and their eventual
//! outcomes.

use async_trait::async_trait;
use council_domain::{Attachment, Conversation, DeliberationPayload, Message};
use thiserror::Error;

/// Errors that can occur during gateway operations.
///
/// All variants represent the remote side being unavailable or unusable;
/// callers decide per operation whether that is absorbed (reads) or surfaced
/// with optimistic state intact (writes).
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// A settled council reply: the headline answer plus the raw deliberation
/// payload (either multi-step or legacy flat shape)
#[derive(Debug, Clone, Default)]
pub struct CouncilReply {
    pub response: String,
    pub deliberation: DeliberationPayload,
}

impl CouncilReply {
    pub fn new(response: impl Into<String>, deliberation: DeliberationPayload) -> Self {
        Self {
            response: response.into(),
            deliberation,
        }
    }
}

/// Gateway to the remote council backend
///
/// The deliberation pipeline itself (model fan-out, ranking collection,
/// synthesis) is opaque here; `send_message` contracts only its eventual
/// outcome and payload shape. Implementations live in the infrastructure
/// layer.
#[async_trait]
pub trait CouncilGateway: Send + Sync {
    /// List all conversations, newest first
    async fn list_conversations(&self) -> Result<Vec<Conversation>, GatewayError>;

    /// Fetch the message timeline of one conversation
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, GatewayError>;

    /// Create a new conversation, returning the authoritative record
    async fn create_conversation(&self) -> Result<Conversation, GatewayError>;

    /// Run the council on a user message and return the settled reply
    async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
        attachment: Option<&Attachment>,
    ) -> Result<CouncilReply, GatewayError>;

    /// Delete a conversation; `true` when the remote side removed it
    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool, GatewayError>;
}
