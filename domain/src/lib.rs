//! Domain layer for llm-council
//!
//! This crate contains the core entities and pure state machines of the
//! council client. It has no dependencies on infrastructure or presentation
//! concerns, and nothing in here is async.
//!
//! # Core Concepts
//!
//! ## Council deliberation
//!
//! Every assistant reply is produced by a remote three-stage council run:
//!
//! - **Stage 1**: independent responses from each council member
//! - **Stage 2**: blind peer ranking of those responses
//! - **Stage 3**: a chairman model synthesizes the final answer
//!
//! A reply may contain several workflow **steps**, each carrying its own
//! three stages. Legacy replies carry a single flat set of stages; both
//! shapes normalize into one [`DeliberationRecord`].
//!
//! ## Navigation
//!
//! [`NavigationState`] is a two-axis cursor (step × stage) over one record.
//! The axes are independent: switching step never resets the stage.

pub mod confirmation;
pub mod conversation;
pub mod core;
pub mod deliberation;
pub mod util;

// Re-export commonly used types
pub use confirmation::DeletionConfirmationFlow;
pub use conversation::entities::{Attachment, Conversation, Message, Role, SyncState};
pub use crate::core::error::DomainError;
pub use deliberation::{
    navigation::{NavigationState, Stage},
    payload::{DeliberationPayload, StagesPayload, StepPayload},
    record::{DeliberationRecord, ModelRanking, ModelResponse, Step, StepStatus, SynthesisResult},
};
pub use util::truncate_str;
