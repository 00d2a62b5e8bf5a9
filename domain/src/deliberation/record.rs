//! Deliberation value objects - immutable trace types for council replies.
//!
//! These types represent the outputs of each council stage:
//! - [`ModelResponse`] - one member's answer from the independent-response stage
//! - [`ModelRanking`] - one member's blind ranking of the other answers
//! - [`SynthesisResult`] - the chairman's combined answer
//! - [`Step`] - one workflow unit carrying all three stages
//! - [`DeliberationRecord`] - the complete normalized trace

use serde::{Deserialize, Serialize};

/// Response from a single council member in the independent-response stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The model that generated this response
    pub model: String,
    /// The response content
    #[serde(rename = "response")]
    pub text: String,
}

impl ModelResponse {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
        }
    }
}

/// Blind ranking of the other members' responses by one council member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRanking {
    /// The model that performed the ranking
    pub model: String,
    /// The ranking content, typically a "RANKING:" block
    #[serde(rename = "ranking")]
    pub ranking_text: String,
}

impl ModelRanking {
    pub fn new(model: impl Into<String>, ranking_text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ranking_text: ranking_text.into(),
        }
    }
}

/// Final synthesis from the chairman model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// The model that performed the synthesis
    pub model: String,
    /// The synthesized conclusion
    #[serde(rename = "response")]
    pub text: String,
}

impl SynthesisResult {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
        }
    }
}

/// Completion status of a workflow step
///
/// Parsed leniently from the wire; unknown strings map to `Unknown` rather
/// than failing normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    #[default]
    Completed,
    #[serde(other)]
    Unknown,
}

/// One workflow unit within a deliberation record, containing all three stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub stage1: Vec<ModelResponse>,
    #[serde(default)]
    pub stage2: Vec<ModelRanking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage3: Option<SynthesisResult>,
}

impl Step {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: StepStatus::default(),
            stage1: Vec::new(),
            stage2: Vec::new(),
            stage3: None,
        }
    }

    pub fn with_stage1(mut self, responses: Vec<ModelResponse>) -> Self {
        self.stage1 = responses;
        self
    }

    pub fn with_stage2(mut self, rankings: Vec<ModelRanking>) -> Self {
        self.stage2 = rankings;
        self
    }

    pub fn with_stage3(mut self, synthesis: SynthesisResult) -> Self {
        self.stage3 = Some(synthesis);
        self
    }
}

/// Complete normalized deliberation trace for one assistant reply
///
/// Invariant: contains at least one step. Legacy flat payloads are wrapped
/// into a single synthetic step during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliberationRecord {
    steps: Vec<Step>,
}

impl DeliberationRecord {
    /// Title used for the synthetic step wrapping a legacy flat payload
    pub const LEGACY_STEP_TITLE: &'static str = "Analysis";

    /// Id used for the synthetic step wrapping a legacy flat payload
    pub const LEGACY_STEP_ID: &'static str = "default";

    /// Build a record from an explicit step sequence.
    ///
    /// An empty sequence still yields a valid record: a single empty
    /// synthetic step, so the ≥1-step invariant holds unconditionally.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        if steps.is_empty() {
            return Self::legacy(Vec::new(), Vec::new(), None);
        }
        Self { steps }
    }

    /// Build a record from a legacy flat stage set
    pub fn legacy(
        stage1: Vec<ModelResponse>,
        stage2: Vec<ModelRanking>,
        stage3: Option<SynthesisResult>,
    ) -> Self {
        let mut step = Step::new(Self::LEGACY_STEP_ID, Self::LEGACY_STEP_TITLE)
            .with_stage1(stage1)
            .with_stage2(stage2);
        step.stage3 = stage3;
        Self { steps: vec![step] }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }
}
