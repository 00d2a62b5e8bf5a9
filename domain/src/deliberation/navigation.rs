//! Two-axis navigation cursor over one deliberation record.
//!
//! The step axis and the stage axis are independent: a user comparing
//! syntheses across steps is not bounced back to stage 1 when switching
//! steps. The stage opens on [`Stage::Synthesis`] because most users want
//! the answer before the deliberation.

use super::record::DeliberationRecord;
use serde::{Deserialize, Serialize};

/// One of the three fixed council stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Stage 1: independent responses from each member
    Responses,
    /// Stage 2: blind peer ranking
    Rankings,
    /// Stage 3: chairman synthesis
    Synthesis,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::Responses => 1,
            Stage::Rankings => 2,
            Stage::Synthesis => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Stage::Responses),
            2 => Some(Stage::Rankings),
            3 => Some(Stage::Synthesis),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Responses => "Individual Responses",
            Stage::Rankings => "Peer Ranking (Blind)",
            Stage::Synthesis => "Final Synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Cursor over one open [`DeliberationRecord`]
///
/// Invariants: `step_index < step_count` whenever a record is open, and the
/// stage is always one of the three fixed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    step_index: usize,
    step_count: usize,
    stage: Stage,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            step_index: 0,
            step_count: 0,
            stage: Stage::Synthesis,
        }
    }
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the cursor at a different record.
    ///
    /// Resets the step axis to 0 and adopts the record's step count. The
    /// stage selection is a user habit, not a per-record property, so it
    /// survives the switch.
    pub fn open(&mut self, record: &DeliberationRecord) {
        self.step_index = 0;
        self.step_count = record.step_count();
    }

    /// Close the trace view; step bookkeeping is dropped, stage is kept
    pub fn close(&mut self) {
        self.step_index = 0;
        self.step_count = 0;
    }

    /// Whether a record is currently open
    pub fn is_open(&self) -> bool {
        self.step_count > 0
    }

    /// Select a step by index. Out-of-range selection is a contract
    /// violation: asserted in debug builds, silent no-op otherwise.
    ///
    /// Returns whether the selection applied. The stage axis is untouched.
    pub fn select_step(&mut self, index: usize) -> bool {
        debug_assert!(
            index < self.step_count,
            "step index {index} out of range (count {})",
            self.step_count
        );
        if index < self.step_count {
            self.step_index = index;
            true
        } else {
            false
        }
    }

    /// Select a stage; always applies, independent of the step axis
    pub fn select_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deliberation::record::Step;

    fn record_with_steps(n: usize) -> DeliberationRecord {
        let steps = (0..n)
            .map(|i| Step::new(format!("step_{i}"), format!("Step {i}")))
            .collect();
        DeliberationRecord::from_steps(steps)
    }

    #[test]
    fn initial_stage_is_synthesis() {
        let nav = NavigationState::new();
        assert_eq!(nav.stage(), Stage::Synthesis);
        assert_eq!(nav.step_index(), 0);
    }

    #[test]
    fn axes_are_independent() {
        let mut nav = NavigationState::new();
        nav.open(&record_with_steps(3));

        nav.select_stage(Stage::Rankings);
        assert!(nav.select_step(1));

        assert_eq!(nav.stage(), Stage::Rankings);
        assert_eq!(nav.step_index(), 1);
    }

    #[test]
    fn opening_new_record_resets_step_keeps_stage() {
        let mut nav = NavigationState::new();
        nav.open(&record_with_steps(3));
        nav.select_stage(Stage::Responses);
        assert!(nav.select_step(2));

        nav.open(&record_with_steps(2));
        assert_eq!(nav.step_index(), 0);
        assert_eq!(nav.step_count(), 2);
        assert_eq!(nav.stage(), Stage::Responses);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "out of range"))]
    fn out_of_range_step_is_rejected() {
        let mut nav = NavigationState::new();
        nav.open(&record_with_steps(2));
        let applied = nav.select_step(5);
        // Release builds: silent no-op, cursor unchanged
        assert!(!applied);
        assert_eq!(nav.step_index(), 0);
    }

    #[test]
    fn close_keeps_stage_preference() {
        let mut nav = NavigationState::new();
        nav.open(&record_with_steps(2));
        nav.select_stage(Stage::Rankings);
        nav.close();

        assert!(!nav.is_open());
        assert_eq!(nav.stage(), Stage::Rankings);
    }

    #[test]
    fn stage_number_round_trip() {
        for n in 1..=3 {
            assert_eq!(Stage::from_number(n).unwrap().number(), n);
        }
        assert!(Stage::from_number(0).is_none());
        assert!(Stage::from_number(4).is_none());
    }
}
