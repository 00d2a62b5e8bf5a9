//! Wire types for the council backend API.
//!
//! Historical messages carry their deliberation trace under `council_data`,
//! in either the multi-step or the legacy flat shape. Normalization happens
//! here, at the boundary, so nothing downstream branches on the raw shape.
//! An undecodable `council_data` blob is logged and rendered as absent —
//! never an error (the normalizer itself is total, so this path is
//! defensive only).

use council_application::CouncilReply;
use council_domain::{DeliberationPayload, DeliberationRecord, Message, Role};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A timeline message as the backend serves it
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub council_data: Option<serde_json::Value>,
}

impl WireMessage {
    /// Convert into the domain message, normalizing any deliberation trace
    pub fn into_message(self) -> Message {
        let deliberation = self.council_data.and_then(|value| {
            match DeliberationRecord::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(message_id = %self.id, error = %e, "undecodable council_data; dropping trace");
                    None
                }
            }
        });

        let mut message = match self.role {
            Role::System => Message::system(self.id, self.content),
            Role::User => Message::user(self.id, self.content),
            Role::Assistant => Message::assistant(self.id, self.content),
        };
        message.deliberation = deliberation;
        message
    }
}

/// `GET /conversations/{id}` response body
#[derive(Debug, Clone, Deserialize)]
pub struct WireConversationDetail {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// `POST /conversations/{id}/message` request body
#[derive(Debug, Clone, Serialize)]
pub struct WireSendRequest<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<&'a str>,
}

/// `POST /conversations/{id}/message` response body: the headline answer
/// plus the deliberation payload spread at the top level
#[derive(Debug, Clone, Deserialize)]
pub struct WireSendResponse {
    #[serde(default)]
    pub response: String,
    #[serde(flatten)]
    pub deliberation: DeliberationPayload,
}

impl From<WireSendResponse> for CouncilReply {
    fn from(wire: WireSendResponse) -> Self {
        CouncilReply::new(wire.response, wire.deliberation)
    }
}
