//! Deletion confirmation flow — an ephemeral gate in front of destructive
//! deletes.
//!
//! Only one confirmation may be pending at a time: arming a new target
//! implicitly cancels the previous one. An armed gate that is neither
//! confirmed nor cancelled auto-resolves to cancelled after a bounded
//! inactivity window, so a stale confirmation can never fire later.

use std::time::{Duration, Instant};

/// Default inactivity window before an armed confirmation auto-cancels
pub const DEFAULT_CONFIRM_WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct ArmedTarget {
    id: String,
    armed_at: Instant,
}

/// Two-state gate: `armed(target) → {confirmed | cancelled}`
#[derive(Debug, Clone)]
pub struct DeletionConfirmationFlow {
    armed: Option<ArmedTarget>,
    window: Duration,
}

impl Default for DeletionConfirmationFlow {
    fn default() -> Self {
        Self {
            armed: None,
            window: DEFAULT_CONFIRM_WINDOW,
        }
    }
}

impl DeletionConfirmationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the inactivity window
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Arm the gate for a target id.
    ///
    /// Returns the previously armed id when one was pending, which is
    /// thereby implicitly cancelled.
    pub fn arm(&mut self, target_id: impl Into<String>) -> Option<String> {
        let previous = self.armed.take().map(|t| t.id);
        self.armed = Some(ArmedTarget {
            id: target_id.into(),
            armed_at: Instant::now(),
        });
        previous
    }

    /// Confirm the pending target, yielding it exactly once.
    ///
    /// Returns `None` when nothing is armed or the window has elapsed.
    pub fn confirm(&mut self) -> Option<String> {
        self.expire_stale();
        self.armed.take().map(|t| t.id)
    }

    /// Cancel the pending confirmation; no side effect
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    /// The currently armed target, if still within the window
    pub fn pending(&mut self) -> Option<&str> {
        self.expire_stale();
        self.armed.as_ref().map(|t| t.id.as_str())
    }

    fn expire_stale(&mut self) {
        if let Some(target) = &self.armed
            && target.armed_at.elapsed() > self.window
        {
            self.armed = None;
        }
    }
}
