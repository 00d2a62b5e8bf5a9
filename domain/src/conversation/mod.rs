//! Conversation domain module

pub mod entities;
