//! Wire payload shapes and their normalization into [`DeliberationRecord`].
//!
//! Historical payloads come in two shapes:
//!
//! - multi-step: `{steps: [{id, title, status, data: {stage1, stage2, stage3}}]}`
//!   (some producers inline the stages on the step instead of nesting them
//!   under `data`)
//! - legacy flat: `{stage1: [...], stage2: [...], stage3: {...}}`
//!
//! Normalization is pure and total: a missing stage yields an empty sequence
//! (stage1/stage2) or an absent synthesis (stage3), and a legacy payload is
//! wrapped into one synthetic "Analysis" step. Consumers render absence as
//! "no data for this stage", never as an error.

use super::record::{DeliberationRecord, ModelRanking, ModelResponse, Step, StepStatus, SynthesisResult};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One set of the three council stages, all optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagesPayload {
    #[serde(default)]
    pub stage1: Vec<ModelResponse>,
    #[serde(default)]
    pub stage2: Vec<ModelRanking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage3: Option<SynthesisResult>,
}

impl StagesPayload {
    fn is_empty(&self) -> bool {
        self.stage1.is_empty() && self.stage2.is_empty() && self.stage3.is_none()
    }
}

/// One workflow step as it appears on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: StepStatus,
    /// Stages nested under `data` (the multi-step producer's shape)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<StagesPayload>,
    /// Stages inlined on the step itself (fallback shape)
    #[serde(flatten)]
    pub inline: StagesPayload,
}

impl StepPayload {
    /// Resolve the nested-vs-inline ambiguity: `data` wins when present
    fn into_stages(self) -> StagesPayload {
        match self.data {
            Some(data) if !data.is_empty() || self.inline.is_empty() => data,
            Some(_) | None => self.inline,
        }
    }
}

/// An arbitrary settled deliberation payload, covering both wire shapes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliberationPayload {
    /// Explicit step sequence; absence marks a legacy flat payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepPayload>>,
    /// Top-level stages of a legacy flat payload
    #[serde(flatten)]
    pub flat: StagesPayload,
}

impl DeliberationPayload {
    /// Whether this payload carries any deliberation content at all
    pub fn is_empty(&self) -> bool {
        self.steps.is_none() && self.flat.is_empty()
    }
}

impl DeliberationRecord {
    /// Normalize an arbitrary settled payload into the canonical record.
    ///
    /// Pure and total: an explicit step sequence is used verbatim (order
    /// preserved); anything else becomes one synthetic "Analysis" step whose
    /// stages are copied from the payload's top-level fields.
    pub fn normalize(payload: DeliberationPayload) -> Self {
        match payload.steps {
            Some(steps) => {
                let steps = steps
                    .into_iter()
                    .enumerate()
                    .map(|(idx, raw)| {
                        let id = raw.id.clone().unwrap_or_else(|| format!("step_{}", idx + 1));
                        let title = raw
                            .title
                            .clone()
                            .unwrap_or_else(|| format!("Step {}", idx + 1));
                        let status = raw.status;
                        let stages = raw.into_stages();
                        Step {
                            id,
                            title,
                            status,
                            stage1: stages.stage1,
                            stage2: stages.stage2,
                            stage3: stages.stage3,
                        }
                    })
                    .collect();
                Self::from_steps(steps)
            }
            None => Self::legacy(payload.flat.stage1, payload.flat.stage2, payload.flat.stage3),
        }
    }

    /// Decode a raw JSON blob and normalize it. The only failure mode is a
    /// blob that doesn't fit either wire shape at all.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DomainError> {
        let payload: DeliberationPayload =
            serde_json::from_value(value).map_err(|e| DomainError::DataShape(e.to_string()))?;
        Ok(Self::normalize(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_json() -> &'static str {
        r#"{
            "stage1": [
                {"model": "GPT-4", "response": "Use median imputation.", "raw_response": {}},
                {"model": "Claude-3-Opus", "response": "Create FamilySize feature."}
            ],
            "stage2": [
                {"model": "GPT-4", "ranking": "RANKING:\n1. Claude-3-Opus\n2. GPT-4"}
            ],
            "stage3": {"model": "Chairman-GPT-4", "response": "Consensus reached."}
        }"#
    }

    #[test]
    fn legacy_flat_payload_wraps_into_analysis_step() {
        let payload: DeliberationPayload = serde_json::from_str(flat_json()).unwrap();
        let record = DeliberationRecord::normalize(payload);

        assert_eq!(record.step_count(), 1);
        let step = &record.steps()[0];
        assert_eq!(step.id, "default");
        assert_eq!(step.title, "Analysis");
        assert_eq!(step.stage1.len(), 2);
        assert_eq!(step.stage1[0].text, "Use median imputation.");
        assert_eq!(step.stage2.len(), 1);
        assert_eq!(step.stage3.as_ref().unwrap().model, "Chairman-GPT-4");
    }

    #[test]
    fn multi_step_payload_preserves_steps_in_order() {
        let json = r#"{
            "steps": [
                {
                    "id": "step_fe",
                    "title": "Feature Engineering",
                    "status": "completed",
                    "data": {
                        "stage1": [{"model": "GPT-4", "response": "Imputed Age."}],
                        "stage2": [{"model": "GPT-4", "ranking": "RANKING:\n1. GPT-4"}],
                        "stage3": {"model": "Chairman-GPT-4", "response": "Proceed."}
                    }
                },
                {
                    "id": "step_model",
                    "title": "Modeling Strategy",
                    "status": "completed",
                    "data": {
                        "stage1": [{"model": "Groq-Llama-3", "response": "XGBoost."}],
                        "stage2": [],
                        "stage3": {"model": "Chairman-GPT-4", "response": "Train XGBoost."}
                    }
                }
            ]
        }"#;
        let payload: DeliberationPayload = serde_json::from_str(json).unwrap();
        let record = DeliberationRecord::normalize(payload);

        assert_eq!(record.step_count(), 2);
        assert_eq!(record.steps()[0].id, "step_fe");
        assert_eq!(record.steps()[1].id, "step_model");
        assert_eq!(record.steps()[0].status, StepStatus::Completed);
        assert_eq!(record.steps()[1].stage1[0].model, "Groq-Llama-3");
    }

    #[test]
    fn step_with_inline_stages_falls_back() {
        let json = r#"{
            "steps": [
                {
                    "id": "s1",
                    "title": "Inline",
                    "stage1": [{"model": "GPT-4", "response": "inline answer"}]
                }
            ]
        }"#;
        let payload: DeliberationPayload = serde_json::from_str(json).unwrap();
        let record = DeliberationRecord::normalize(payload);

        assert_eq!(record.steps()[0].stage1[0].text, "inline answer");
    }

    #[test]
    fn missing_stages_yield_empty_not_error() {
        let payload: DeliberationPayload = serde_json::from_str("{}").unwrap();
        let record = DeliberationRecord::normalize(payload);

        assert_eq!(record.step_count(), 1);
        let step = &record.steps()[0];
        assert!(step.stage1.is_empty());
        assert!(step.stage2.is_empty());
        assert!(step.stage3.is_none());
    }

    #[test]
    fn step_without_id_or_title_gets_positional_defaults() {
        let json = r#"{"steps": [{}, {}]}"#;
        let payload: DeliberationPayload = serde_json::from_str(json).unwrap();
        let record = DeliberationRecord::normalize(payload);

        assert_eq!(record.steps()[0].id, "step_1");
        assert_eq!(record.steps()[1].title, "Step 2");
    }

    #[test]
    fn empty_step_sequence_still_satisfies_min_one_step() {
        let payload: DeliberationPayload = serde_json::from_str(r#"{"steps": []}"#).unwrap();
        let record = DeliberationRecord::normalize(payload);
        assert_eq!(record.step_count(), 1);
    }

    #[test]
    fn from_value_rejects_shapeless_blob() {
        let err =
            DeliberationRecord::from_value(serde_json::json!({"steps": "not-an-array"})).unwrap_err();
        assert!(matches!(err, DomainError::DataShape(_)));

        let record =
            DeliberationRecord::from_value(serde_json::json!({"stage1": []})).unwrap();
        assert_eq!(record.step_count(), 1);
    }
}
