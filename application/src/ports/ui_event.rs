//! UI events emitted by the session controller
//!
//! The controller pushes these onto an unbounded channel; the presentation
//! layer drains them and renders. Notices are transient and dismissible —
//! they never block the interface or discard already-entered input.

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient, dismissible message for the user
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Events flowing from the session controller to the presentation layer
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A transient notice to show the user
    Notice(Notice),
    /// The conversation list changed (create, delete, refresh, sync update)
    ConversationsChanged,
    /// A timeline changed; carries the owning conversation id because a
    /// settled send may land in a conversation that is no longer active
    TimelineChanged { conversation_id: String },
    /// A deliberation trace was opened for the given message
    TraceOpened { message_id: String },
    /// The open trace was discarded
    TraceClosed,
    /// A delete confirmation is pending for the given conversation
    DeleteArmed { conversation_id: String },
}
