use std::collections::HashSet;

use super::config::{ScaleDefinition, ScoringMethod};
use super::fixed::is_fixed_scale;

/// Validate a scale definition from the scale library.
/// Returns all validation errors at once (not just the first).
pub fn validate_scale(scale: &ScaleDefinition) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let id = scale.id.trim();
    let prefix = if id.is_empty() { "scale" } else { id };

    if id.is_empty() {
        errors.push("scale.id: must not be empty".to_string());
    } else if is_fixed_scale(id) {
        errors.push(format!(
            "{}.id: reserved for the built-in 90-item scale",
            prefix
        ));
    }

    if let Some(ref method) = scale.method {
        if ScoringMethod::parse(method).is_none() {
            errors.push(format!(
                "{}.method: unknown method '{}' (expected sum, weighted or average)",
                prefix, method
            ));
        }
    }

    if let (Some(min), Some(max)) = (scale.min_score, scale.max_score) {
        if min > max {
            errors.push(format!(
                "{}.min_score: {} is greater than max_score {}",
                prefix, min, max
            ));
        }
    }

    // Validate item metadata
    if let Some(ref items) = scale.items {
        for (key, item) in items {
            if let Some(weight) = item.weight {
                if !weight.is_finite() || weight < 0.0 {
                    errors.push(format!(
                        "{}.items[{}].weight: must be a non-negative number",
                        prefix, key
                    ));
                }
            }
            if let Some(ref options) = item.options {
                if options.is_empty() {
                    errors.push(format!(
                        "{}.items[{}].options: must not be empty",
                        prefix, key
                    ));
                }
            }
        }
    }

    // Validate interpretation levels
    if let Some(ref levels) = scale.interpretations {
        let mut previous_upper: Option<f64> = None;
        for (i, level) in levels.iter().enumerate() {
            if level.level.trim().is_empty() {
                errors.push(format!(
                    "{}.interpretations[{}].level: must not be empty",
                    prefix, i
                ));
            }
            if level.lower() > level.upper() {
                errors.push(format!(
                    "{}.interpretations[{}]: min {} is greater than max {}",
                    prefix,
                    i,
                    level.lower(),
                    level.upper()
                ));
            }
            if let Some(upper) = previous_upper {
                if level.lower() <= upper {
                    errors.push(format!(
                        "{}.interpretations[{}]: overlaps or precedes the previous level",
                        prefix, i
                    ));
                }
            }
            previous_upper = Some(level.upper());
        }
    }

    // Validate dimension definitions
    if let Some(ref dimensions) = scale.dimensions {
        let mut names = HashSet::new();
        for (i, dimension) in dimensions.iter().enumerate() {
            let name = dimension.name.trim();
            if name.is_empty() {
                errors.push(format!(
                    "{}.dimensions[{}].name: must not be empty",
                    prefix, i
                ));
            } else if !names.insert(name.to_string()) {
                errors.push(format!(
                    "{}.dimensions[{}].name: duplicate dimension '{}'",
                    prefix, i, name
                ));
            }
            if dimension.items.is_empty() {
                errors.push(format!(
                    "{}.dimensions[{}].items: must list at least one item",
                    prefix, i
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
