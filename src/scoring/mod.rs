pub mod config;
pub mod configurable;
pub mod error;
pub mod factors;
pub mod fixed;
pub mod interpretation;
pub mod normalizer;
pub mod router;
pub mod types;
pub mod validation;

pub use config::*;
pub use configurable::{score_configurable, ConfigurableScore, DimensionStrategy, ItemSource};
pub use error::{Result, ScoringError};
pub use factors::{FactorDefinition, FIXED_FACTORS};
pub use fixed::{is_fixed_scale, score_fixed, FixedScore, SeverityLevel};
pub use normalizer::{AnswerNormalizer, RangeCheck};
pub use router::{dispatch, score_request};
pub use types::*;
pub use validation::validate_scale;
