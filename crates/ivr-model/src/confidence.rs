//! Review bands for mapping confidence.
//!
//! The engine accepts any eligible mapping; these bands tell a reviewer
//! which accepted mappings deserve a second look before the form is sent.

use serde::{Deserialize, Serialize};

use crate::mapping::{ALIAS_CONFIDENCE, EXACT_CONFIDENCE};

/// How much review an accepted mapping needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Barely eligible fuzzy match; confirm against the form.
    Low,
    /// Close fuzzy match; spot check.
    Medium,
    /// Exact or alias match; send as is.
    High,
}

impl ConfidenceLevel {
    /// Short reviewer hint shown next to the mapping.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "send as is",
            Self::Medium => "spot check before submission",
            Self::Low => "confirm field against the form",
        }
    }

    pub fn needs_review(&self) -> bool {
        !matches!(self, Self::High)
    }
}

/// Lower bounds of each review band. Confidence below `low` gets no band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

impl Default for ConfidenceThresholds {
    /// Alias matches and better are trusted; fuzzy matches are split at 0.8.
    fn default() -> Self {
        Self {
            high: ALIAS_CONFIDENCE,
            medium: 0.80,
            low: 0.60,
        }
    }
}

impl ConfidenceThresholds {
    /// Only exact matches skip review.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            high: EXACT_CONFIDENCE,
            medium: 0.90,
            low: 0.75,
        }
    }

    /// Strong fuzzy matches count as trusted too.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            high: 0.90,
            medium: 0.70,
            low: 0.50,
        }
    }

    #[must_use]
    pub fn categorize(&self, confidence: f32) -> Option<ConfidenceLevel> {
        if confidence >= self.high {
            Some(ConfidenceLevel::High)
        } else if confidence >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if confidence >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}
