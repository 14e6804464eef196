use super::config::InterpretationLevel;
use super::types::{Interpretation, InterpretationSource};

/// Scores below this are "normal" when no interpretation levels are configured.
/// The constant is scale-agnostic and kept for compatibility with existing reports.
pub const DEFAULT_NORMAL_CEILING: f64 = 10.0;

impl From<&InterpretationLevel> for Interpretation {
    fn from(level: &InterpretationLevel) -> Self {
        Interpretation {
            level: level.level.clone(),
            description: level.description.clone(),
            guidance: level.guidance.clone(),
        }
    }
}

/// Pick the interpretation for a score.
///
/// Levels are checked in declared order and the first containing level wins.
/// If none contains the score, the last declared level is used. With no
/// levels at all, the built-in two-bucket default applies.
pub fn interpret(score: f64, levels: Option<&[InterpretationLevel]>) -> (Interpretation, InterpretationSource) {
    let levels = match levels {
        Some(levels) if !levels.is_empty() => levels,
        _ => {
            tracing::debug!("No interpretation levels configured, using default buckets");
            return (default_interpretation(score), InterpretationSource::Default);
        }
    };

    match levels.iter().find(|l| l.contains(score)) {
        Some(level) => (level.into(), InterpretationSource::Configured),
        None => {
            let last = &levels[levels.len() - 1];
            tracing::debug!(score, level = %last.level, "No level matched, using last level");
            (last.into(), InterpretationSource::Fallback)
        }
    }
}

fn default_interpretation(score: f64) -> Interpretation {
    if score < DEFAULT_NORMAL_CEILING {
        Interpretation {
            level: "normal".to_string(),
            description: "Score is within the normal range.".to_string(),
            guidance: vec!["Maintain current healthy habits.".to_string()],
        }
    } else {
        Interpretation {
            level: "mild".to_string(),
            description: "Score suggests mild concerns.".to_string(),
            guidance: vec![
                "Consider speaking with a counselor.".to_string(),
                "Configure interpretation levels for this scale for a precise reading.".to_string(),
            ],
        }
    }
}
