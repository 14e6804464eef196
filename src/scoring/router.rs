use super::configurable::{score_configurable, ConfigurableScore};
use super::error::Result;
use super::fixed::{is_fixed_scale, score_fixed, FixedScore, NATIONAL_NORM_MEAN, NATIONAL_NORM_SD};
use super::types::{
    round2, DimensionStrategyKind, InterpretationSource, NormComparison, ScoreEnvelope,
    ScoreRange, ScoreRequest, ScoreResult, ScorerKind, ScoringMetadata, SubScore, SymptomBreadth,
};

/// Score a request and wrap the outcome in a response envelope.
///
/// Any scorer error becomes a failure envelope; partial results are never
/// returned.
pub fn score_request(request: &ScoreRequest) -> ScoreEnvelope {
    match dispatch(request) {
        Ok(result) => ScoreEnvelope::ok(result),
        Err(e) => {
            tracing::warn!(scale = %request.scale_id, "Scoring failed: {}", e);
            ScoreEnvelope::failure(e.to_string())
        }
    }
}

/// Route by scale id: fixed-scale aliases go to the fixed scorer, everything
/// else to the configurable scorer.
pub fn dispatch(request: &ScoreRequest) -> Result<ScoreResult> {
    if is_fixed_scale(&request.scale_id) {
        tracing::debug!(scale = %request.scale_id, "Routing to fixed factor scorer");
        let score = score_fixed(&request.answers, request.item_metadata.as_ref())?;
        Ok(from_fixed(request, score))
    } else {
        tracing::debug!(scale = %request.scale_id, "Routing to configurable scorer");
        let score = score_configurable(request)?;
        Ok(from_configurable(request, score))
    }
}

fn score_range(request: &ScoreRequest) -> Option<ScoreRange> {
    request
        .scale_config
        .as_ref()
        .filter(|c| c.min_score.is_some() || c.max_score.is_some())
        .map(|c| ScoreRange {
            min: c.min_score,
            max: c.max_score,
        })
}

fn from_fixed(request: &ScoreRequest, score: FixedScore) -> ScoreResult {
    let severity = score.interpretation();
    let breakdown = score
        .factors
        .iter()
        .map(|f| SubScore {
            name: f.factor.name.to_string(),
            description: None,
            sum: f.sum,
            mean: round2(f.mean),
            item_count: f.factor.len(),
            norm_mean: Some(f.factor.norm_mean),
            above_norm: Some(f.above_norm),
        })
        .collect();

    ScoreResult {
        scale_id: request.scale_id.clone(),
        total_score: score.total_score,
        mean_score: score.total_mean,
        final_score: score.total_score,
        item_count: request.answers.len(),
        breakdown,
        severity,
        norm_comparison: Some(NormComparison {
            norm_mean: NATIONAL_NORM_MEAN,
            norm_sd: NATIONAL_NORM_SD,
            z_score: score.z_score,
        }),
        symptom_breadth: Some(SymptomBreadth {
            positive_item_count: score.positive_item_count,
            positive_symptom_mean: round2(score.positive_symptom_mean),
        }),
        metadata: ScoringMetadata {
            scorer: ScorerKind::Fixed,
            method: "sum".to_string(),
            weights_applied: false,
            reverse_scoring_applied: score.reversed_items > 0,
            simplified: false,
            dimension_strategy: Some(DimensionStrategyKind::Fixed),
            interpretation_source: InterpretationSource::FixedCutPoints,
            score_range: score_range(request),
        },
    }
}

fn from_configurable(request: &ScoreRequest, score: ConfigurableScore) -> ScoreResult {
    let breakdown = score
        .dimensions
        .into_iter()
        .map(|d| SubScore {
            name: d.name,
            description: d.description,
            sum: d.sum,
            mean: d.mean,
            item_count: d.item_count,
            norm_mean: None,
            above_norm: None,
        })
        .collect();

    ScoreResult {
        scale_id: request.scale_id.clone(),
        total_score: score.total_score,
        mean_score: score.mean_score,
        final_score: score.final_score,
        item_count: score.item_count,
        breakdown,
        severity: score.interpretation,
        norm_comparison: None,
        symptom_breadth: None,
        metadata: ScoringMetadata {
            scorer: ScorerKind::Configurable,
            method: score.method.as_str().to_string(),
            weights_applied: score.weights_applied,
            reverse_scoring_applied: score.reverse_scoring_applied,
            simplified: score.simplified,
            dimension_strategy: Some(score.dimension_strategy),
            interpretation_source: score.interpretation_source,
            score_range: score_range(request),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::{ItemMetadata, ScaleConfig};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn fixed_request(scale_id: &str, count: usize, value: f64) -> ScoreRequest {
        ScoreRequest::new(
            scale_id,
            (1..=count).map(|i| (i.to_string(), value)).collect(),
        )
    }

    #[test]
    fn test_routes_fixed_alias_case_insensitive() {
        let envelope = score_request(&fixed_request("SCL-90", 90, 1.0));
        assert!(envelope.success);
        let result = envelope.result.unwrap();
        assert_eq!(result.metadata.scorer, ScorerKind::Fixed);
        assert_eq!(result.total_score, 90.0);
        assert_eq!(result.mean_score, 1.0);
        assert_eq!(result.severity.level, "normal");
        assert_eq!(result.breakdown.len(), 10);
        assert_eq!(result.symptom_breadth.unwrap().positive_item_count, 0);
        assert!(result.norm_comparison.is_some());
    }

    #[test]
    fn test_fixed_all_fives() {
        let result = dispatch(&fixed_request("scl90", 90, 5.0)).unwrap();
        assert_eq!(result.total_score, 450.0);
        assert_eq!(result.severity.level, "severe");
        assert_eq!(result.symptom_breadth.unwrap().positive_item_count, 90);
        assert!(result.breakdown.iter().all(|f| f.above_norm == Some(true)));
        // Every factor mean 5.0 >= 2.0 and above norm, all named in guidance
        assert!(result.severity.guidance.iter().any(|g| g.contains("Psychoticism")));
    }

    #[test]
    fn test_incomplete_fixed_request_is_failure_envelope() {
        let envelope = score_request(&fixed_request("scl-90", 89, 1.0));
        assert!(!envelope.success);
        assert!(envelope.result.is_none());
        let error = envelope.error.unwrap();
        assert!(error.contains("89"), "{}", error);
    }

    #[test]
    fn test_unknown_scale_routes_to_configurable_with_sum() {
        let envelope = score_request(&fixed_request("phq-9", 9, 2.0));
        assert!(envelope.success);
        let result = envelope.result.unwrap();
        assert_eq!(result.metadata.scorer, ScorerKind::Configurable);
        assert_eq!(result.metadata.method, "sum");
        assert!(result.metadata.simplified);
        assert_eq!(result.final_score, 18.0);
        assert_eq!(result.mean_score, 2.0);
        assert_eq!(result.severity.level, "mild");
        assert!(result.norm_comparison.is_none());
    }

    #[test]
    fn test_overflowing_configurable_total_is_failure_envelope() {
        let envelope = score_request(&fixed_request("custom", 2, 1e308));
        assert!(!envelope.success);
        assert!(envelope.result.is_none());
        let error = envelope.error.unwrap();
        assert!(error.starts_with("Computation error"), "{}", error);
    }

    #[test]
    fn test_padded_alias_is_not_fixed() {
        let envelope = score_request(&fixed_request(" scl-90 ", 3, 1.0));
        assert!(envelope.success);
        assert_eq!(envelope.result.unwrap().metadata.scorer, ScorerKind::Configurable);
    }

    #[test]
    fn test_near_alias_is_not_fixed() {
        // Would fail the 90-item check if it were routed to the fixed scorer
        let envelope = score_request(&fixed_request("scl-90-r", 3, 1.0));
        assert!(envelope.success);
        assert_eq!(envelope.result.unwrap().metadata.scorer, ScorerKind::Configurable);
    }

    #[test]
    fn test_score_range_echoed() {
        let mut request = fixed_request("custom", 2, 1.0);
        request.scale_config = Some(ScaleConfig {
            method: None,
            min_score: Some(0.0),
            max_score: Some(10.0),
        });
        let result = dispatch(&request).unwrap();
        assert_eq!(
            result.metadata.score_range,
            Some(ScoreRange {
                min: Some(0.0),
                max: Some(10.0)
            })
        );
    }

    #[test]
    fn test_configurable_metadata_flags() {
        let mut request = fixed_request("custom", 2, 2.0);
        request.item_metadata = Some(BTreeMap::from([(
            "1".to_string(),
            ItemMetadata {
                reverse_scored: true,
                weight: Some(2.0),
                ..Default::default()
            },
        )]));
        let result = dispatch(&request).unwrap();
        // item 1: (6 - 2) * 2 = 8, item 2: 2
        assert_eq!(result.total_score, 10.0);
        assert!(result.metadata.weights_applied);
        assert!(result.metadata.reverse_scoring_applied);
        assert!(!result.metadata.simplified);
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope = score_request(&fixed_request("custom", 1, 3.0));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["result"]["total_score"], 3.0);
        assert_eq!(json["result"]["metadata"]["scorer"], "configurable");
        assert!(json.get("error").is_none());
    }
}
