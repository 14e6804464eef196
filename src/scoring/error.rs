use thiserror::Error;

/// Errors raised by the scoring engine.
///
/// Only the fixed scorer raises `Validation` for malformed input; the
/// configurable scorer degrades gracefully instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Computation error: {message}")]
    Computation { message: String },
}

impl ScoringError {
    pub fn validation(message: impl Into<String>) -> Self {
        ScoringError::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ScoringError::Configuration {
            message: message.into(),
        }
    }

    pub fn computation(message: impl Into<String>) -> Self {
        ScoringError::Computation {
            message: message.into(),
        }
    }

    /// Wrong number of answers for a fixed-length scale
    pub fn answer_count(actual: usize, expected: usize) -> Self {
        Self::validation(format!(
            "incomplete answers: got {} answers, expected {}",
            actual, expected
        ))
    }

    pub fn out_of_range(item: &str, value: f64, min: f64, max: f64) -> Self {
        Self::validation(format!(
            "item '{}' has value {} outside the allowed range [{}, {}]",
            item, value, min, max
        ))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ScoringError::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;
