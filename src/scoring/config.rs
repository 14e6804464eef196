use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregation method for the configurable scorer.
///
/// `Sum` and `Weighted` both report the weighted total; the names only record
/// whether explicit weights were expected. `Average` divides by total weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    #[default]
    Sum,
    Weighted,
    Average,
}

impl ScoringMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Some(ScoringMethod::Sum),
            "weighted" => Some(ScoringMethod::Weighted),
            "average" => Some(ScoringMethod::Average),
            _ => None,
        }
    }

    /// Resolve a configured method name. Unknown names fall back to `Sum`.
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            None => ScoringMethod::Sum,
            Some(s) => ScoringMethod::parse(s).unwrap_or_else(|| {
                tracing::warn!("Unknown scoring method '{}', falling back to sum", s);
                ScoringMethod::Sum
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::Sum => "sum",
            ScoringMethod::Weighted => "weighted",
            ScoringMethod::Average => "average",
        }
    }
}

/// Per-call scale configuration.
///
/// Example YAML:
/// ```yaml
/// method: average
/// min_score: 0
/// max_score: 27
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ScaleConfig {
    /// Aggregation method name: "sum", "weighted" or "average" (default: sum)
    #[serde(default)]
    pub method: Option<String>,

    /// Declared lower bound of the final score, echoed in result metadata
    #[serde(default)]
    pub min_score: Option<f64>,

    /// Declared upper bound of the final score, echoed in result metadata
    #[serde(default)]
    pub max_score: Option<f64>,
}

impl ScaleConfig {
    pub fn method(&self) -> ScoringMethod {
        ScoringMethod::resolve(self.method.as_deref())
    }
}

/// A single selectable answer option.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AnswerOption {
    pub value: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Metadata describing how one item is scored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ItemMetadata {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub ordinal: Option<u32>,

    #[serde(default)]
    pub reverse_scored: bool,

    /// Item weight (default: 1.0)
    #[serde(default)]
    pub weight: Option<f64>,

    #[serde(default)]
    pub dimension: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub subdomain: Option<String>,

    /// Option set; its min/max values bound the valid raw range
    #[serde(default)]
    pub options: Option<Vec<AnswerOption>>,
}

impl ItemMetadata {
    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }

    /// (min, max) of the declared option values, if any options exist
    pub fn option_bounds(&self) -> Option<(f64, f64)> {
        let options = self.options.as_ref()?;
        let mut values = options.iter().map(|o| o.value);
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Grouping tag for implicit dimensions: dimension, then subdomain, then domain
    pub fn group_tag(&self) -> Option<&str> {
        [&self.dimension, &self.subdomain, &self.domain]
            .into_iter()
            .find_map(|tag| tag.as_deref().filter(|t| !t.trim().is_empty()))
    }
}

/// Reference to an item inside a dimension definition: an ordinal or an id.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ItemKey {
    Ordinal(u32),
    Id(String),
}

/// Caller-defined dimension used by the explicit aggregation strategy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DimensionDefinition {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, alias = "members")]
    pub items: Vec<ItemKey>,
}

/// One entry of an ordered interpretation table.
///
/// Both bounds are inclusive. A missing `max` means unbounded above and a
/// missing `min` unbounded below.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InterpretationLevel {
    #[serde(default, alias = "min_score")]
    pub min: Option<f64>,

    #[serde(default, alias = "max_score")]
    pub max: Option<f64>,

    #[serde(alias = "label")]
    pub level: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub guidance: Vec<String>,
}

impl InterpretationLevel {
    pub fn lower(&self) -> f64 {
        self.min.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(f64::INFINITY)
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.lower() && score <= self.upper()
    }
}

/// A named scale stored in the scale library.
///
/// Example YAML:
/// ```yaml
/// id: phq-9
/// name: Patient Health Questionnaire
/// method: sum
/// max_score: 27
/// items:
///   "1": { dimension: mood, options: [{ value: 0 }, { value: 3 }] }
/// interpretations:
///   - { min: 0, max: 4, level: minimal }
///   - { min: 5, level: elevated }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScaleDefinition {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub min_score: Option<f64>,

    #[serde(default)]
    pub max_score: Option<f64>,

    #[serde(default)]
    pub items: Option<BTreeMap<String, ItemMetadata>>,

    #[serde(default)]
    pub interpretations: Option<Vec<InterpretationLevel>>,

    #[serde(default)]
    pub dimensions: Option<Vec<DimensionDefinition>>,
}

impl ScaleDefinition {
    pub fn scale_config(&self) -> ScaleConfig {
        ScaleConfig {
            method: self.method.clone(),
            min_score: self.min_score,
            max_score: self.max_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!(ScoringMethod::parse("Weighted"), Some(ScoringMethod::Weighted));
        assert_eq!(ScoringMethod::parse(" average "), Some(ScoringMethod::Average));
        assert_eq!(ScoringMethod::parse("median"), None);
    }

    #[test]
    fn test_unknown_method_falls_back_to_sum() {
        assert_eq!(ScoringMethod::resolve(Some("median")), ScoringMethod::Sum);
        assert_eq!(ScoringMethod::resolve(None), ScoringMethod::Sum);
    }

    #[test]
    fn test_default_weight() {
        let meta = ItemMetadata::default();
        assert_eq!(meta.weight(), 1.0);
        assert!(meta.option_bounds().is_none());
    }

    #[test]
    fn test_option_bounds_unordered() {
        let meta = ItemMetadata {
            options: Some(vec![
                AnswerOption { value: 3.0, label: None },
                AnswerOption { value: 1.0, label: None },
                AnswerOption { value: 4.0, label: None },
            ]),
            ..Default::default()
        };
        assert_eq!(meta.option_bounds(), Some((1.0, 4.0)));
    }

    #[test]
    fn test_empty_option_set_has_no_bounds() {
        let meta = ItemMetadata {
            options: Some(vec![]),
            ..Default::default()
        };
        assert!(meta.option_bounds().is_none());
    }

    #[test]
    fn test_group_tag_precedence() {
        let meta = ItemMetadata {
            domain: Some("affect".to_string()),
            subdomain: Some("sadness".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.group_tag(), Some("sadness"));

        let meta = ItemMetadata {
            dimension: Some("mood".to_string()),
            domain: Some("affect".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.group_tag(), Some("mood"));

        let meta = ItemMetadata {
            dimension: Some("  ".to_string()),
            domain: Some("affect".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.group_tag(), Some("affect"));
    }

    #[test]
    fn test_level_open_upper_bound() {
        let level = InterpretationLevel {
            min: Some(10.0),
            max: None,
            level: "severe".to_string(),
            description: String::new(),
            guidance: vec![],
        };
        assert!(level.contains(10.0));
        assert!(level.contains(1e9));
        assert!(!level.contains(9.99));
    }

    #[test]
    fn test_item_key_untagged_parse() {
        let keys: Vec<ItemKey> = serde_json::from_str(r#"[3, "q7"]"#).unwrap();
        assert_eq!(keys, vec![ItemKey::Ordinal(3), ItemKey::Id("q7".to_string())]);
    }

    #[test]
    fn test_scale_definition_yaml_parse() {
        let yaml = r#"
id: phq-9
method: sum
max_score: 27
items:
  "1":
    dimension: mood
    options:
      - value: 0
      - value: 3
interpretations:
  - { min: 0, max: 4, level: minimal }
  - { min: 5, label: elevated }
dimensions:
  - name: mood
    members: [1, 2]
"#;
        let scale: ScaleDefinition = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(scale.id, "phq-9");
        assert_eq!(scale.scale_config().method(), ScoringMethod::Sum);
        let items = scale.items.unwrap();
        assert_eq!(items["1"].option_bounds(), Some((0.0, 3.0)));
        let levels = scale.interpretations.unwrap();
        assert_eq!(levels[1].level, "elevated");
        assert!(levels[1].max.is_none());
        let dims = scale.dimensions.unwrap();
        assert_eq!(dims[0].items, vec![ItemKey::Ordinal(1), ItemKey::Ordinal(2)]);
    }

    #[test]
    fn test_scale_definition_rejects_unknown_fields() {
        let yaml = "id: x\nbase_score: 3\n";
        let result: Result<ScaleDefinition, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }
}
