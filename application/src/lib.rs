//! Application layer for llm-council
//!
//! This crate contains the session state engine: the conversation store, the
//! per-conversation send pipeline, the session controller routing external
//! intents, and the ports its adapters implement. It depends only on the
//! domain layer.
//!
//! All state transitions run on one logical thread (the controller takes
//! `&mut self`); the only suspension points are the asynchronous gateway
//! calls. Timeline order always equals intent order, never remote settlement
//! order.

pub mod pipeline;
pub mod ports;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use pipeline::send::{MessageSendPipeline, SendError, SendState};
pub use ports::{
    council_gateway::{CouncilGateway, CouncilReply, GatewayError},
    ui_event::{Notice, NoticeLevel, UiEvent},
};
pub use session::controller::{SessionController, SessionError};
pub use store::conversation_store::{ConversationListSnapshot, ConversationStore};
