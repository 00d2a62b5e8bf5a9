//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Precondition violations against the state machines live in the
/// application layer next to the operations that raise them; what remains
/// here is the data-shape boundary of the deliberation payloads.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed deliberation payload: {0}")]
    DataShape(String),
}
