use serde::{Deserialize, Serialize};

use crate::scoring::{ScaleDefinition, ScoreRequest};

/// Scale library file contents.
///
/// Example YAML:
/// ```yaml
/// scales:
///   - id: phq-9
///     method: sum
///     interpretations:
///       - { min: 0, max: 4, level: minimal }
///       - { min: 5, level: elevated }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scales: Vec<ScaleDefinition>,
}

impl Config {
    /// Look up a scale by id (case-insensitive)
    pub fn find_scale(&self, scale_id: &str) -> Option<&ScaleDefinition> {
        let id = scale_id.trim();
        self.scales.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }

    /// Fill in whatever the request left empty from the matching library scale.
    /// Returns true if a library scale matched.
    pub fn apply_to(&self, request: &mut ScoreRequest) -> bool {
        let Some(scale) = self.find_scale(&request.scale_id) else {
            return false;
        };

        if request.scale_config.is_none() {
            request.scale_config = Some(scale.scale_config());
        }
        if request.item_metadata.is_none() {
            request.item_metadata = scale.items.clone();
        }
        if request.interpretations.is_none() {
            request.interpretations = scale.interpretations.clone();
        }
        if request.dimensions.is_none() {
            request.dimensions = scale.dimensions.clone();
        }
        true
    }
}
