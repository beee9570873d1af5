//! Source-to-target field mapping types.

use serde::{Deserialize, Serialize};

use crate::ocr::OcrVerdict;

/// Confidence assigned to an exact match.
pub const EXACT_CONFIDENCE: f32 = 1.0;

/// Confidence assigned to an alias-corpus match.
pub const ALIAS_CONFIDENCE: f32 = 0.95;

/// Ceiling for fuzzy-match confidence. A fuzzy match always ranks below an
/// alias match, even when the similarity score is 1.0.
pub const MAX_FUZZY_CONFIDENCE: f32 = 0.94;

/// Confidence reported for a fuzzy match with the given similarity score.
pub fn fuzzy_confidence(score: f32) -> f32 {
    score.clamp(0.0, MAX_FUZZY_CONFIDENCE)
}

/// How a mapping was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Alias,
    Fuzzy,
    Unresolved,
}

impl MatchMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Alias => "alias",
            Self::Fuzzy => "fuzzy",
            Self::Unresolved => "unresolved",
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mapping decision for one source field.
///
/// Invariant: an `Unresolved` mapping has no target, zero confidence and is
/// never accepted. The constructors uphold this; deserialized values are
/// checked with [`FieldMapping::is_consistent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Source field key.
    pub source_key: String,
    /// Verbatim target field name from the catalog.
    pub target_name: Option<String>,
    pub method: MatchMethod,
    /// Confidence score (0.0 to 1.0).
    pub confidence: f32,
    pub accepted: bool,
    /// OCR outcome; `NotChecked` until reconciliation runs.
    #[serde(default)]
    pub ocr: OcrVerdict,
}

impl FieldMapping {
    /// An accepted mapping decided by the resolver.
    pub fn matched(
        source_key: impl Into<String>,
        target_name: impl Into<String>,
        method: MatchMethod,
        confidence: f32,
    ) -> Self {
        debug_assert!(method != MatchMethod::Unresolved);
        Self {
            source_key: source_key.into(),
            target_name: Some(target_name.into()),
            method,
            confidence: confidence.clamp(0.0, 1.0),
            accepted: true,
            ocr: OcrVerdict::NotChecked,
        }
    }

    pub fn exact(source_key: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self::matched(source_key, target_name, MatchMethod::Exact, EXACT_CONFIDENCE)
    }

    pub fn alias(source_key: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self::matched(source_key, target_name, MatchMethod::Alias, ALIAS_CONFIDENCE)
    }

    pub fn fuzzy(
        source_key: impl Into<String>,
        target_name: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self::matched(
            source_key,
            target_name,
            MatchMethod::Fuzzy,
            fuzzy_confidence(confidence),
        )
    }

    /// A mapping entered or confirmed by a person; trusted like an exact match.
    pub fn manual(source_key: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self::exact(source_key, target_name)
    }

    pub fn unresolved(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            target_name: None,
            method: MatchMethod::Unresolved,
            confidence: 0.0,
            accepted: false,
            ocr: OcrVerdict::NotChecked,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.method != MatchMethod::Unresolved
    }

    /// Accepted mapping's target, if any.
    pub fn accepted_target(&self) -> Option<&str> {
        if self.accepted {
            self.target_name.as_deref()
        } else {
            None
        }
    }

    pub fn divergence_flag(&self) -> bool {
        self.ocr.divergence_flag()
    }

    /// Checks the unresolved invariant and the confidence range.
    pub fn is_consistent(&self) -> bool {
        let in_range = (0.0..=1.0).contains(&self.confidence);
        match self.method {
            MatchMethod::Unresolved => {
                in_range && self.target_name.is_none() && !self.accepted && self.confidence == 0.0
            }
            _ => in_range && self.target_name.is_some(),
        }
    }
}

/// Why a stale mapping was re-pointed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionReason {
    /// The alias corpus names a field present in the current catalog.
    AliasMatch,
    /// A similar name in the current catalog cleared the correction threshold.
    FuzzyMatch,
    /// Below the correction threshold, accepted through an explicit override.
    ForcedBelowThreshold,
}

/// A stored mapping re-pointed at a field that exists in the current catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub source_key: String,
    pub original_target_name: String,
    pub corrected_target_name: String,
    pub method: MatchMethod,
    pub confidence: f32,
    pub reason: CorrectionReason,
}

/// Why a stale mapping was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Nothing in the current catalog cleared the fuzzy eligibility threshold.
    NoEligibleCandidate,
    /// The best candidate was eligible but below the correction threshold.
    BelowCorrectionThreshold,
    /// Forced acceptance was requested without the confirming override flag.
    LowConfidenceOverrideRejected,
    /// The mapping pointed at a missing field and was never accepted.
    NotAccepted,
}

/// A stored mapping dropped because its target no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalRecord {
    pub source_key: String,
    pub invalid_target_name: String,
    pub reason: RemovalReason,
    /// Best rejected candidate, kept for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_candidate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_confidence: Option<f32>,
}
