use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config::{DimensionDefinition, InterpretationLevel, ItemMetadata, ScaleConfig};

/// A fully materialized scoring request.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ScoreRequest {
    #[serde(alias = "scale")]
    pub scale_id: String,

    /// Item key -> raw answer value
    pub answers: BTreeMap<String, f64>,

    #[serde(default)]
    pub scale_config: Option<ScaleConfig>,

    #[serde(default)]
    pub item_metadata: Option<BTreeMap<String, ItemMetadata>>,

    #[serde(default)]
    pub interpretations: Option<Vec<InterpretationLevel>>,

    #[serde(default)]
    pub dimensions: Option<Vec<DimensionDefinition>>,
}

impl ScoreRequest {
    pub fn new(scale_id: impl Into<String>, answers: BTreeMap<String, f64>) -> Self {
        Self {
            scale_id: scale_id.into(),
            answers,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Fixed,
    Configurable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStrategyKind {
    Explicit,
    Implicit,
    /// Fixed factor table
    Fixed,
}

/// Where the reported severity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationSource {
    /// A configured level contained the score
    Configured,
    /// No configured level matched; the last one was used
    Fallback,
    /// No levels configured; built-in two-bucket default
    Default,
    /// Fixed cut points of the 90-item scale
    FixedCutPoints,
}

/// Severity classification with its description and guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub level: String,
    pub description: String,
    pub guidance: Vec<String>,
}

/// A factor or dimension sub-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sum: f64,
    pub mean: f64,
    pub item_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norm_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub above_norm: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormComparison {
    pub norm_mean: f64,
    pub norm_sd: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymptomBreadth {
    pub positive_item_count: usize,
    pub positive_symptom_mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Flags describing which optional behaviors shaped a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringMetadata {
    pub scorer: ScorerKind,
    pub method: String,
    pub weights_applied: bool,
    pub reverse_scoring_applied: bool,
    pub simplified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_strategy: Option<DimensionStrategyKind>,
    pub interpretation_source: InterpretationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_range: Option<ScoreRange>,
}

/// Unified result produced by either scorer.
///
/// `total_score`, `mean_score`, `breakdown` and `severity` are always
/// populated; report generators key on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scale_id: String,
    pub total_score: f64,
    pub mean_score: f64,
    pub final_score: f64,
    pub item_count: usize,
    pub breakdown: Vec<SubScore>,
    pub severity: Interpretation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norm_comparison: Option<NormComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_breadth: Option<SymptomBreadth>,
    pub metadata: ScoringMetadata,
}

/// Response envelope: a result or an error message, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreEnvelope {
    pub fn ok(result: ScoreResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Round to two decimals for reporting
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
