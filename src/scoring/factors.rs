/// One bucket of the fixed 90-item symptom checklist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorDefinition {
    pub key: &'static str,
    pub name: &'static str,
    /// First ordinal, inclusive
    pub first: u32,
    /// Last ordinal, inclusive
    pub last: u32,
    /// Published normative factor mean
    pub norm_mean: f64,
}

impl FactorDefinition {
    pub fn contains(&self, ordinal: u32) -> bool {
        ordinal >= self.first && ordinal <= self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    pub fn ordinals(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.last
    }
}

/// Nine named factors plus the residual bucket. Ranges are contiguous and
/// partition 1..=90.
pub static FIXED_FACTORS: [FactorDefinition; 10] = [
    FactorDefinition {
        key: "somatization",
        name: "Somatization",
        first: 1,
        last: 12,
        norm_mean: 1.37,
    },
    FactorDefinition {
        key: "obsessive_compulsive",
        name: "Obsessive-Compulsive",
        first: 13,
        last: 22,
        norm_mean: 1.62,
    },
    FactorDefinition {
        key: "interpersonal_sensitivity",
        name: "Interpersonal Sensitivity",
        first: 23,
        last: 31,
        norm_mean: 1.65,
    },
    FactorDefinition {
        key: "depression",
        name: "Depression",
        first: 32,
        last: 44,
        norm_mean: 1.50,
    },
    FactorDefinition {
        key: "anxiety",
        name: "Anxiety",
        first: 45,
        last: 54,
        norm_mean: 1.39,
    },
    FactorDefinition {
        key: "hostility",
        name: "Hostility",
        first: 55,
        last: 60,
        norm_mean: 1.48,
    },
    FactorDefinition {
        key: "phobic_anxiety",
        name: "Phobic Anxiety",
        first: 61,
        last: 67,
        norm_mean: 1.23,
    },
    FactorDefinition {
        key: "paranoid_ideation",
        name: "Paranoid Ideation",
        first: 68,
        last: 73,
        norm_mean: 1.43,
    },
    FactorDefinition {
        key: "psychoticism",
        name: "Psychoticism",
        first: 74,
        last: 83,
        norm_mean: 1.29,
    },
    FactorDefinition {
        key: "additional",
        name: "Additional Items",
        first: 84,
        last: 90,
        norm_mean: 1.43,
    },
];

/// Bucket owning an ordinal, if the ordinal is in 1..=90
pub fn factor_for(ordinal: u32) -> Option<&'static FactorDefinition> {
    FIXED_FACTORS.iter().find(|f| f.contains(ordinal))
}
