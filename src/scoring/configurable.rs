use std::collections::BTreeMap;

use super::config::{DimensionDefinition, ItemKey, ItemMetadata, ScoringMethod};
use super::error::{Result, ScoringError};
use super::interpretation::interpret;
use super::normalizer::AnswerNormalizer;
use super::types::{round2, DimensionStrategyKind, Interpretation, InterpretationSource, ScoreRequest};

/// How per-item metadata is available for a call.
///
/// `Simplified` is the documented fallback when no metadata is supplied:
/// the total is the plain sum of raw answers, with no reverse scoring and
/// no weights.
#[derive(Debug, Clone, Copy)]
pub enum ItemSource<'a> {
    Simplified,
    Full(&'a BTreeMap<String, ItemMetadata>),
}

impl<'a> ItemSource<'a> {
    pub fn from_metadata(metadata: Option<&'a BTreeMap<String, ItemMetadata>>) -> Self {
        match metadata {
            Some(m) if !m.is_empty() => ItemSource::Full(m),
            _ => ItemSource::Simplified,
        }
    }

    pub fn is_simplified(&self) -> bool {
        matches!(self, ItemSource::Simplified)
    }
}

/// One answer after direction correction and weighting.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<'a> {
    pub key: &'a str,
    pub metadata: Option<&'a ItemMetadata>,
    pub raw: f64,
    pub adjusted: f64,
    pub weight: f64,
    pub reversed: bool,
}

impl ScoredItem<'_> {
    /// Contribution to the total
    pub fn value(&self) -> f64 {
        self.adjusted * self.weight
    }

    /// Ordinal from metadata, else from a numeric key
    pub fn ordinal(&self) -> Option<u32> {
        self.metadata
            .and_then(|m| m.ordinal)
            .or_else(|| self.key.trim().parse().ok())
    }

    pub fn matches(&self, member: &ItemKey) -> bool {
        match member {
            ItemKey::Ordinal(n) => self.ordinal() == Some(*n),
            ItemKey::Id(id) => {
                self.key == id.as_str()
                    || self.metadata.and_then(|m| m.id.as_deref()) == Some(id.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScore {
    pub name: String,
    pub description: Option<String>,
    pub sum: f64,
    /// Rounded to two decimals
    pub mean: f64,
    pub item_count: usize,
}

#[derive(Default)]
struct GroupAccumulator {
    sum: f64,
    count: usize,
}

impl GroupAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn finish(self, name: String, description: Option<String>) -> DimensionScore {
        let mean = if self.count == 0 {
            0.0
        } else {
            round2(self.sum / self.count as f64)
        };
        DimensionScore {
            name,
            description,
            sum: self.sum,
            mean,
            item_count: self.count,
        }
    }
}

/// Dimension aggregation strategy, chosen once per call.
#[derive(Debug, Clone, Copy)]
pub enum DimensionStrategy<'a> {
    /// Caller-supplied definitions with explicit member lists
    Explicit(&'a [DimensionDefinition]),
    /// Group by each item's own dimension/subdomain/domain tag
    Implicit,
}

impl<'a> DimensionStrategy<'a> {
    pub fn select(definitions: Option<&'a [DimensionDefinition]>) -> Self {
        match definitions {
            Some(defs) if !defs.is_empty() => DimensionStrategy::Explicit(defs),
            _ => DimensionStrategy::Implicit,
        }
    }

    pub fn kind(&self) -> DimensionStrategyKind {
        match self {
            DimensionStrategy::Explicit(_) => DimensionStrategyKind::Explicit,
            DimensionStrategy::Implicit => DimensionStrategyKind::Implicit,
        }
    }

    pub fn aggregate(&self, items: &[ScoredItem<'_>]) -> Vec<DimensionScore> {
        match self {
            DimensionStrategy::Explicit(defs) => aggregate_explicit(defs, items),
            DimensionStrategy::Implicit => aggregate_implicit(items),
        }
    }
}

fn aggregate_explicit(defs: &[DimensionDefinition], items: &[ScoredItem<'_>]) -> Vec<DimensionScore> {
    defs.iter()
        .map(|def| {
            let mut acc = GroupAccumulator::default();
            for item in items.iter().filter(|i| def.items.iter().any(|m| i.matches(m))) {
                acc.add(item.value());
            }
            acc.finish(def.name.clone(), def.description.clone())
        })
        .collect()
}

fn aggregate_implicit(items: &[ScoredItem<'_>]) -> Vec<DimensionScore> {
    // Groups keep first-appearance order
    let mut groups: Vec<(String, GroupAccumulator)> = Vec::new();
    for item in items {
        let Some(tag) = item.metadata.and_then(|m| m.group_tag()) else {
            continue;
        };
        match groups.iter_mut().find(|(name, _)| name == tag) {
            Some((_, acc)) => acc.add(item.value()),
            None => {
                let mut acc = GroupAccumulator::default();
                acc.add(item.value());
                groups.push((tag.to_string(), acc));
            }
        }
    }
    groups
        .into_iter()
        .map(|(name, acc)| acc.finish(name, None))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurableScore {
    pub total_score: f64,
    pub total_weight: f64,
    /// Depends on the method: total for sum/weighted, total / total_weight for average
    pub final_score: f64,
    /// Always total / answered item count
    pub mean_score: f64,
    pub item_count: usize,
    pub method: ScoringMethod,
    pub dimensions: Vec<DimensionScore>,
    pub dimension_strategy: DimensionStrategyKind,
    pub interpretation: Interpretation,
    pub interpretation_source: InterpretationSource,
    pub weights_applied: bool,
    pub reverse_scoring_applied: bool,
    pub simplified: bool,
}

fn score_items<'a>(
    answers: &'a BTreeMap<String, f64>,
    source: ItemSource<'a>,
) -> Result<Vec<ScoredItem<'a>>> {
    let normalizer = AnswerNormalizer::permissive();
    let mut items: Vec<ScoredItem<'a>> = match source {
        ItemSource::Simplified => normalizer
            .normalize(answers, None)?
            .into_iter()
            .map(|a| ScoredItem {
                key: a.key,
                metadata: None,
                raw: a.raw,
                adjusted: a.raw,
                weight: 1.0,
                reversed: false,
            })
            .collect(),
        ItemSource::Full(metadata) => normalizer
            .normalize(answers, Some(metadata))?
            .into_iter()
            .map(|a| {
                let weight = a.metadata.map(|m| m.weight()).unwrap_or(1.0);
                if !weight.is_finite() {
                    return Err(ScoringError::configuration(format!(
                        "item '{}' has a non-finite weight",
                        a.key
                    )));
                }
                Ok(ScoredItem {
                    key: a.key,
                    metadata: a.metadata,
                    raw: a.raw,
                    adjusted: a.adjusted,
                    weight,
                    reversed: a.reversed,
                })
            })
            .collect::<Result<_>>()?,
    };

    // Ordinal order first, then remaining keys lexically
    items.sort_by(|a, b| match (a.ordinal(), b.ordinal()) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.key.cmp(b.key)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.key.cmp(b.key),
    });
    Ok(items)
}

/// Score an arbitrary scale from the request's own configuration.
///
/// Out-of-range raw values are accepted. Missing dimension or interpretation
/// configuration degrades to implicit grouping and the default buckets.
pub fn score_configurable(request: &ScoreRequest) -> Result<ConfigurableScore> {
    let method = request
        .scale_config
        .as_ref()
        .map(|c| c.method())
        .unwrap_or_default();
    let source = ItemSource::from_metadata(request.item_metadata.as_ref());
    let items = score_items(&request.answers, source)?;

    let total_score: f64 = items.iter().map(|i| i.value()).sum();
    let total_weight: f64 = items.iter().map(|i| i.weight).sum();
    let item_count = items.len();

    let final_score = match method {
        ScoringMethod::Sum | ScoringMethod::Weighted => total_score,
        ScoringMethod::Average => {
            if total_weight == 0.0 {
                0.0
            } else {
                total_score / total_weight
            }
        }
    };
    let mean_score = if item_count == 0 {
        0.0
    } else {
        total_score / item_count as f64
    };

    for (name, value) in [
        ("total_score", total_score),
        ("total_weight", total_weight),
        ("final_score", final_score),
        ("mean_score", mean_score),
    ] {
        if !value.is_finite() {
            return Err(ScoringError::computation(format!(
                "{} is not finite for scale '{}'",
                name, request.scale_id
            )));
        }
    }

    let strategy = DimensionStrategy::select(request.dimensions.as_deref());
    let dimensions = strategy.aggregate(&items);
    let (interpretation, interpretation_source) =
        interpret(final_score, request.interpretations.as_deref());

    tracing::debug!(
        scale = %request.scale_id,
        method = method.as_str(),
        simplified = source.is_simplified(),
        strategy = ?strategy.kind(),
        final_score,
        "Scored configurable scale"
    );

    Ok(ConfigurableScore {
        total_score,
        total_weight,
        final_score,
        mean_score,
        item_count,
        method,
        dimensions,
        dimension_strategy: strategy.kind(),
        interpretation,
        interpretation_source,
        weights_applied: items.iter().any(|i| i.weight != 1.0),
        reverse_scoring_applied: items.iter().any(|i| i.reversed),
        simplified: source.is_simplified(),
    })
}
