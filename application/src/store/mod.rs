//! Conversation state ownership

pub mod conversation_store;
