use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::ItemMetadata;
use super::error::{Result, ScoringError};
use super::factors::{FactorDefinition, FIXED_FACTORS};
use super::normalizer::{AnswerNormalizer, DEFAULT_POINT_COUNT};
use super::types::{round2, Interpretation};

pub const ITEM_COUNT: usize = 90;

/// Scale identifiers routed to the fixed scorer (compared case-insensitively)
pub const FIXED_SCALE_ALIASES: &[&str] = &["scl-90", "scl90", "scl_90"];

pub const NATIONAL_NORM_MEAN: f64 = 1.44;
pub const NATIONAL_NORM_SD: f64 = 0.43;

/// Adjusted values at or above this count as positive items
pub const POSITIVE_THRESHOLD: f64 = 2.0;

/// Factor means at or above this are called out in guidance when above norm
pub const FACTOR_ATTENTION_THRESHOLD: f64 = 2.0;

pub fn is_fixed_scale(scale_id: &str) -> bool {
    FIXED_SCALE_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(scale_id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    /// Cut points on the total mean: <1.5, [1.5,2), [2,3), >=3
    pub fn from_total_mean(total_mean: f64) -> Self {
        if total_mean < 1.5 {
            SeverityLevel::Normal
        } else if total_mean < 2.0 {
            SeverityLevel::Mild
        } else if total_mean < 3.0 {
            SeverityLevel::Moderate
        } else {
            SeverityLevel::Severe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Normal => "normal",
            SeverityLevel::Mild => "mild",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::Severe => "severe",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SeverityLevel::Normal => "Overall symptom level is within the normal range.",
            SeverityLevel::Mild => "Mild symptoms are present across several areas.",
            SeverityLevel::Moderate => "Moderate symptoms are present and may affect daily functioning.",
            SeverityLevel::Severe => "Severe symptoms are present; professional assessment is recommended.",
        }
    }

    fn base_guidance(&self) -> Vec<String> {
        let lines: &[&str] = match self {
            SeverityLevel::Normal => &[
                "Keep up regular routines for sleep, exercise and social contact.",
            ],
            SeverityLevel::Mild => &[
                "Watch for changes over the next few weeks.",
                "Talking with a counselor or trusted person can help.",
            ],
            SeverityLevel::Moderate => &[
                "Arrange a consultation with the school counseling center.",
                "Reduce avoidable stressors where possible.",
            ],
            SeverityLevel::Severe => &[
                "Seek a professional mental health evaluation promptly.",
                "Make sure a guardian or counselor is informed.",
            ],
        };
        lines.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorScore {
    pub factor: &'static FactorDefinition,
    pub sum: f64,
    /// Unrounded factor mean
    pub mean: f64,
    pub above_norm: bool,
}

impl FactorScore {
    fn needs_attention(&self) -> bool {
        self.above_norm && self.mean >= FACTOR_ATTENTION_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedScore {
    pub total_score: f64,
    pub total_mean: f64,
    pub positive_item_count: usize,
    pub positive_symptom_mean: f64,
    pub factors: Vec<FactorScore>,
    pub severity: SeverityLevel,
    pub guidance: Vec<String>,
    pub z_score: f64,
    pub reversed_items: usize,
}

impl FixedScore {
    pub fn interpretation(&self) -> Interpretation {
        Interpretation {
            level: self.severity.as_str().to_string(),
            description: self.severity.description().to_string(),
            guidance: self.guidance.clone(),
        }
    }
}

/// Parse an answer key into an ordinal in 1..=90
fn parse_ordinal(key: &str) -> Result<u32> {
    match key.trim().parse::<u32>() {
        Ok(n) if (1..=ITEM_COUNT as u32).contains(&n) => Ok(n),
        _ => Err(ScoringError::validation(format!(
            "item key '{}' is not an ordinal in 1..{}",
            key, ITEM_COUNT
        ))),
    }
}

/// Score the fixed 90-item scale.
///
/// Requires exactly one answer per ordinal 1..=90, each in [1,5].
/// Option metadata only affects reverse scoring, never the allowed range.
/// Any violation fails the whole call.
pub fn score_fixed(
    answers: &BTreeMap<String, f64>,
    metadata: Option<&BTreeMap<String, ItemMetadata>>,
) -> Result<FixedScore> {
    if answers.len() != ITEM_COUNT {
        return Err(ScoringError::answer_count(answers.len(), ITEM_COUNT));
    }

    let normalizer = AnswerNormalizer::bounded(DEFAULT_POINT_COUNT);
    let mut adjusted: [Option<f64>; ITEM_COUNT] = [None; ITEM_COUNT];
    let mut reversed_items = 0;

    for answer in normalizer.normalize(answers, metadata)? {
        let ordinal = parse_ordinal(answer.key)?;
        let slot = &mut adjusted[(ordinal - 1) as usize];
        if slot.is_some() {
            return Err(ScoringError::validation(format!(
                "duplicate answer for item {}",
                ordinal
            )));
        }
        *slot = Some(answer.adjusted);
        if answer.reversed {
            reversed_items += 1;
        }
    }

    // 90 distinct in-range ordinals leave no gaps, but keep the check explicit.
    let mut values = [0.0; ITEM_COUNT];
    for (i, slot) in adjusted.iter().enumerate() {
        values[i] = slot.ok_or_else(|| {
            ScoringError::validation(format!("missing answer for item {}", i + 1))
        })?;
    }

    let total_score: f64 = values.iter().sum();
    let total_mean = total_score / ITEM_COUNT as f64;

    let positives: Vec<f64> = values
        .iter()
        .copied()
        .filter(|&v| v >= POSITIVE_THRESHOLD)
        .collect();
    let positive_item_count = positives.len();
    let positive_symptom_mean = if positive_item_count == 0 {
        0.0
    } else {
        positives.iter().sum::<f64>() / positive_item_count as f64
    };

    let factors: Vec<FactorScore> = FIXED_FACTORS
        .iter()
        .map(|factor| {
            let sum: f64 = factor
                .ordinals()
                .map(|ordinal| values[(ordinal - 1) as usize])
                .sum();
            let mean = sum / factor.len() as f64;
            FactorScore {
                factor,
                sum,
                mean,
                above_norm: mean > factor.norm_mean,
            }
        })
        .collect();

    let severity = SeverityLevel::from_total_mean(total_mean);
    let z_score = round2((total_mean - NATIONAL_NORM_MEAN) / NATIONAL_NORM_SD);
    let guidance = build_guidance(severity, &factors);

    tracing::debug!(
        total_score,
        total_mean,
        positive_item_count,
        severity = severity.as_str(),
        "Scored fixed scale"
    );

    Ok(FixedScore {
        total_score,
        total_mean,
        positive_item_count,
        positive_symptom_mean,
        factors,
        severity,
        guidance,
        z_score,
        reversed_items,
    })
}

fn build_guidance(severity: SeverityLevel, factors: &[FactorScore]) -> Vec<String> {
    let mut guidance = severity.base_guidance();

    let flagged: Vec<&str> = factors
        .iter()
        .filter(|f| f.needs_attention())
        .map(|f| f.factor.name)
        .collect();

    if !flagged.is_empty() {
        guidance.push(format!(
            "Elevated above the norm and worth attention: {}.",
            flagged.join(", ")
        ));
    }

    guidance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::AnswerOption;
    use proptest::prelude::*;

    fn uniform_answers(value: f64) -> BTreeMap<String, f64> {
        (1..=ITEM_COUNT).map(|i| (i.to_string(), value)).collect()
    }

    fn answers_from(values: &[f64]) -> BTreeMap<String, f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1).to_string(), v))
            .collect()
    }

    #[test]
    fn test_all_ones_is_normal() {
        let result = score_fixed(&uniform_answers(1.0), None).unwrap();
        assert_eq!(result.total_score, 90.0);
        assert_eq!(result.total_mean, 1.0);
        assert_eq!(result.severity, SeverityLevel::Normal);
        assert_eq!(result.positive_item_count, 0);
        assert_eq!(result.positive_symptom_mean, 0.0);
        assert!(result.factors.iter().all(|f| !f.above_norm));
    }

    #[test]
    fn test_all_fives_is_severe() {
        let result = score_fixed(&uniform_answers(5.0), None).unwrap();
        assert_eq!(result.total_score, 450.0);
        assert_eq!(result.total_mean, 5.0);
        assert_eq!(result.severity, SeverityLevel::Severe);
        assert_eq!(result.positive_item_count, 90);
        assert_eq!(result.positive_symptom_mean, 5.0);
        // (5.0 - 1.44) / 0.43 = 8.279...
        assert_eq!(result.z_score, 8.28);
    }

    #[test]
    fn test_eighty_nine_answers_fails_with_count() {
        let mut answers = uniform_answers(1.0);
        answers.remove("90");
        let err = score_fixed(&answers, None).unwrap_err();
        assert!(err.is_validation());
        let msg = err.to_string();
        assert!(msg.contains("89"), "{}", msg);
        assert!(msg.contains("90"), "{}", msg);
    }

    #[test]
    fn test_out_of_range_value_fails() {
        let mut answers = uniform_answers(1.0);
        answers.insert("17".to_string(), 6.0);
        let err = score_fixed(&answers, None).unwrap_err();
        assert!(err.to_string().contains("'17'"));
    }

    #[test]
    fn test_option_metadata_cannot_widen_range() {
        let mut answers = uniform_answers(1.0);
        answers.insert("1".to_string(), 10.0);
        answers.insert("2".to_string(), 0.0);
        let wide = ItemMetadata {
            options: Some(
                (0..=10)
                    .map(|v| AnswerOption { value: f64::from(v), label: None })
                    .collect(),
            ),
            ..Default::default()
        };
        let metadata = BTreeMap::from([("1".to_string(), wide.clone()), ("2".to_string(), wide)]);

        let err = score_fixed(&answers, Some(&metadata)).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("[1, 5]"), "{}", err);
    }

    #[test]
    fn test_non_ordinal_key_fails() {
        let mut answers = uniform_answers(1.0);
        answers.remove("90");
        answers.insert("q90".to_string(), 1.0);
        let err = score_fixed(&answers, None).unwrap_err();
        assert!(err.to_string().contains("q90"));
    }

    #[test]
    fn test_duplicate_ordinal_fails() {
        let mut answers = uniform_answers(1.0);
        answers.remove("90");
        answers.insert("01".to_string(), 1.0);
        let err = score_fixed(&answers, None).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_severity_cut_points() {
        assert_eq!(SeverityLevel::from_total_mean(1.49), SeverityLevel::Normal);
        assert_eq!(SeverityLevel::from_total_mean(1.5), SeverityLevel::Mild);
        assert_eq!(SeverityLevel::from_total_mean(1.99), SeverityLevel::Mild);
        assert_eq!(SeverityLevel::from_total_mean(2.0), SeverityLevel::Moderate);
        assert_eq!(SeverityLevel::from_total_mean(2.99), SeverityLevel::Moderate);
        assert_eq!(SeverityLevel::from_total_mean(3.0), SeverityLevel::Severe);
    }

    #[test]
    fn test_single_factor_elevated_is_named_in_guidance() {
        // Depression items 32..=44 at 4, everything else at 1
        let mut values = vec![1.0; ITEM_COUNT];
        for v in values.iter_mut().take(44).skip(31) {
            *v = 4.0;
        }
        let result = score_fixed(&answers_from(&values), None).unwrap();

        let depression = result
            .factors
            .iter()
            .find(|f| f.factor.key == "depression")
            .unwrap();
        assert_eq!(depression.sum, 52.0);
        assert_eq!(depression.mean, 4.0);
        assert!(depression.above_norm);

        assert_eq!(result.positive_item_count, 13);
        assert_eq!(result.positive_symptom_mean, 4.0);
        // 77 + 52 = 129 -> mean 1.433 -> normal
        assert_eq!(result.severity, SeverityLevel::Normal);
        assert!(result
            .guidance
            .iter()
            .any(|g| g.contains("Depression") && !g.contains("Anxiety")));
    }

    #[test]
    fn test_above_norm_below_attention_not_named() {
        // Somatization mean 1.5 > 1.37 but < 2.0
        let mut values = vec![1.0; ITEM_COUNT];
        for v in values.iter_mut().take(6) {
            *v = 2.0;
        }
        let result = score_fixed(&answers_from(&values), None).unwrap();
        assert!(result.factors[0].above_norm);
        assert!(!result.guidance.iter().any(|g| g.contains("Somatization")));
    }

    #[test]
    fn test_reverse_scored_item_uses_default_rule() {
        let answers = uniform_answers(1.0);
        let metadata = BTreeMap::from([(
            "5".to_string(),
            ItemMetadata {
                reverse_scored: true,
                ..Default::default()
            },
        )]);
        let result = score_fixed(&answers, Some(&metadata)).unwrap();
        // item 5: 6 - 1 = 5
        assert_eq!(result.total_score, 94.0);
        assert_eq!(result.reversed_items, 1);
        assert_eq!(result.positive_item_count, 1);
    }

    #[test]
    fn test_aliases_case_insensitive() {
        assert!(is_fixed_scale("SCL-90"));
        assert!(is_fixed_scale("scl90"));
        assert!(is_fixed_scale("Scl_90"));
        assert!(!is_fixed_scale("scl-90-r"));
        assert!(!is_fixed_scale(" scl-90 "));
        assert!(!is_fixed_scale("phq-9"));
    }

    proptest! {
        #[test]
        fn prop_total_within_bounds(values in prop::collection::vec(1u32..=5, ITEM_COUNT)) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let result = score_fixed(&answers_from(&values), None).unwrap();
            prop_assert!(result.total_score >= 90.0 && result.total_score <= 450.0);
            prop_assert_eq!(result.total_mean, result.total_score / 90.0);
            let factor_total: f64 = result.factors.iter().map(|f| f.sum).sum();
            prop_assert_eq!(factor_total, result.total_score);
        }
    }
}
