pub mod config;
pub mod logging;
pub mod output;
pub mod scoring;

pub use scoring::{score_request, ScoreEnvelope, ScoreRequest, ScoreResult, ScoringError};
