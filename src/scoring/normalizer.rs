use std::collections::BTreeMap;

use super::config::ItemMetadata;
use super::error::{Result, ScoringError};

/// Point count assumed for reverse scoring when an item has no option set.
pub const DEFAULT_POINT_COUNT: u32 = 5;

/// Whether raw values outside an item's range are rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeCheck {
    /// Item option bounds, else `[1, points]`
    Strict,
    /// Always these bounds; option metadata cannot widen them
    Bounded { min: f64, max: f64 },
    Permissive,
}

/// A direction-corrected answer. Weighting is not applied here.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnswer<'a> {
    pub key: &'a str,
    pub raw: f64,
    pub adjusted: f64,
    pub reversed: bool,
    pub metadata: Option<&'a ItemMetadata>,
}

/// Reverse an answer against a known option maximum: `max - raw + 1`
pub fn reverse_with_max(raw: f64, max_option: f64) -> f64 {
    max_option - raw + 1.0
}

/// Reverse an answer on an assumed `points`-point scale, e.g. `6 - raw` for 5 points
pub fn reverse_with_points(raw: f64, points: u32) -> f64 {
    f64::from(points + 1) - raw
}

#[derive(Debug, Clone, Copy)]
pub struct AnswerNormalizer {
    fallback_points: u32,
    range_check: RangeCheck,
}

impl AnswerNormalizer {
    pub fn new(fallback_points: u32, range_check: RangeCheck) -> Self {
        Self {
            fallback_points,
            range_check,
        }
    }

    pub fn strict() -> Self {
        Self::new(DEFAULT_POINT_COUNT, RangeCheck::Strict)
    }

    pub fn permissive() -> Self {
        Self::new(DEFAULT_POINT_COUNT, RangeCheck::Permissive)
    }

    /// Strict check against `[1, points]` regardless of option metadata
    pub fn bounded(points: u32) -> Self {
        Self::new(
            points,
            RangeCheck::Bounded {
                min: 1.0,
                max: f64::from(points),
            },
        )
    }

    /// Valid raw range for an item. `None` when the range is not enforced.
    pub fn allowed_range(&self, metadata: Option<&ItemMetadata>) -> Option<(f64, f64)> {
        match self.range_check {
            RangeCheck::Strict => Some(
                metadata
                    .and_then(|m| m.option_bounds())
                    .unwrap_or((1.0, f64::from(self.fallback_points))),
            ),
            RangeCheck::Bounded { min, max } => Some((min, max)),
            RangeCheck::Permissive => None,
        }
    }

    /// Apply direction correction to a single answer.
    pub fn adjust(&self, raw: f64, metadata: Option<&ItemMetadata>) -> (f64, bool) {
        match metadata {
            Some(meta) if meta.reverse_scored => {
                let adjusted = match meta.option_bounds() {
                    Some((_, max)) => reverse_with_max(raw, max),
                    None => reverse_with_points(raw, self.fallback_points),
                };
                (adjusted, true)
            }
            _ => (raw, false),
        }
    }

    /// Normalize every answer, looking up metadata by item key.
    ///
    /// Fails on non-finite values, and in strict mode on values outside the
    /// item's allowed range. The error names the offending item.
    pub fn normalize<'a>(
        &self,
        answers: &'a BTreeMap<String, f64>,
        metadata: Option<&'a BTreeMap<String, ItemMetadata>>,
    ) -> Result<Vec<NormalizedAnswer<'a>>> {
        answers
            .iter()
            .map(|(key, &raw)| {
                let meta = metadata.and_then(|m| m.get(key));
                self.normalize_one(key, raw, meta)
            })
            .collect()
    }

    pub fn normalize_one<'a>(
        &self,
        key: &'a str,
        raw: f64,
        metadata: Option<&'a ItemMetadata>,
    ) -> Result<NormalizedAnswer<'a>> {
        if !raw.is_finite() {
            return Err(ScoringError::computation(format!(
                "item '{}' has a non-finite value",
                key
            )));
        }

        if let Some((min, max)) = self.allowed_range(metadata) {
            if raw < min || raw > max {
                return Err(ScoringError::out_of_range(key, raw, min, max));
            }
        }

        let (adjusted, reversed) = self.adjust(raw, metadata);
        Ok(NormalizedAnswer {
            key,
            raw,
            adjusted,
            reversed,
            metadata,
        })
    }
}
