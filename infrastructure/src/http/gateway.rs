//! HTTP implementation of the council gateway port.
//!
//! Talks to the council backend's REST API. Retry and backoff are not
//! handled here; the state engine contracts only the eventual outcome of
//! each call.

use super::wire::{WireConversationDetail, WireSendRequest, WireSendResponse};
use async_trait::async_trait;
use council_application::{CouncilGateway, CouncilReply, GatewayError};
use council_domain::{Attachment, Conversation, Message};
use std::time::Duration;
use tracing::debug;

/// Default backend endpoint, matching the development server
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001/api";

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Gateway adapter over the council backend's REST API
pub struct HttpCouncilGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCouncilGateway {
    /// Build a gateway against the given base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(e: reqwest::Error) -> GatewayError {
        if e.is_connect() || e.is_timeout() {
            GatewayError::Connection(e.to_string())
        } else if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Other(e.to_string())
        }
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CouncilGateway for HttpCouncilGateway {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, GatewayError> {
        let response = self
            .client
            .get(self.url("/conversations"))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::checked(response)
            .await?
            .json::<Vec<Conversation>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/conversations/{conversation_id}")))
            .send()
            .await
            .map_err(Self::transport_error)?;
        let detail = Self::checked(response)
            .await?
            .json::<WireConversationDetail>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        debug!(
            conversation_id,
            count = detail.messages.len(),
            "timeline fetched"
        );
        Ok(detail
            .messages
            .into_iter()
            .map(|m| m.into_message())
            .collect())
    }

    async fn create_conversation(&self) -> Result<Conversation, GatewayError> {
        let response = self
            .client
            .post(self.url("/conversations"))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::checked(response)
            .await?
            .json::<Conversation>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
        attachment: Option<&Attachment>,
    ) -> Result<CouncilReply, GatewayError> {
        let body = WireSendRequest {
            content,
            attachment: attachment.map(|a| a.name.as_str()),
        };
        let response = self
            .client
            .post(self.url(&format!("/conversations/{conversation_id}/message")))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let wire = Self::checked(response)
            .await?
            .json::<WireSendResponse>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(wire.into())
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool, GatewayError> {
        let response = self
            .client
            .delete(self.url(&format!("/conversations/{conversation_id}")))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::checked(response).await?;
        Ok(true)
    }
}
