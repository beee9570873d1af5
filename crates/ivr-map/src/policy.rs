//! Tunable thresholds for resolution, validation and OCR reconciliation.

use std::path::Path;

use ivr_model::NormalizerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::similarity::DEFAULT_FUZZY_THRESHOLD;

/// Default minimum confidence for correcting a stale stored mapping.
pub const DEFAULT_CORRECTION_THRESHOLD: f32 = 0.7;

/// Default similarity below which OCR evidence counts as divergent.
pub const DEFAULT_DIVERGENCE_THRESHOLD: f32 = 0.5;

/// Default margin, in page units, around an anchor region.
pub const DEFAULT_OCR_PROXIMITY: f32 = 24.0;

/// What the validator does with a correction candidate that is eligible but
/// below the correction threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowConfidencePolicy {
    /// Drop the mapping and record a removal.
    #[default]
    Remove,
    /// Accept the candidate anyway. Without `confirmed` the request fails
    /// closed and the mapping is removed.
    ForceAccept {
        #[serde(default)]
        confirmed: bool,
    },
}

/// Every knob the engine exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    pub fuzzy_threshold: f32,
    pub correction_threshold: f32,
    pub divergence_threshold: f32,
    pub ocr_proximity: f32,
    pub ocr_min_label_confidence: f32,
    pub low_confidence: LowConfidencePolicy,
    pub normalizer: NormalizerConfig,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            correction_threshold: DEFAULT_CORRECTION_THRESHOLD,
            divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD,
            ocr_proximity: DEFAULT_OCR_PROXIMITY,
            ocr_min_label_confidence: 0.0,
            low_confidence: LowConfidencePolicy::Remove,
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl MatchPolicy {
    /// Fewer fuzzy matches, more removals, stricter OCR agreement.
    pub fn strict() -> Self {
        Self {
            fuzzy_threshold: 0.75,
            correction_threshold: 0.85,
            divergence_threshold: 0.65,
            ocr_proximity: 12.0,
            ocr_min_label_confidence: 0.5,
            ..Self::default()
        }
    }

    /// More fuzzy matches and corrections.
    pub fn relaxed() -> Self {
        Self {
            fuzzy_threshold: 0.5,
            correction_threshold: 0.6,
            divergence_threshold: 0.4,
            ocr_proximity: 36.0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_low_confidence(mut self, policy: LowConfidencePolicy) -> Self {
        self.low_confidence = policy;
        self
    }

    /// Checks that every threshold lies in `[0, 1]` and the proximity is a
    /// non-negative number.
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("fuzzy_threshold", self.fuzzy_threshold),
            ("correction_threshold", self.correction_threshold),
            ("divergence_threshold", self.divergence_threshold),
            ("ocr_min_label_confidence", self.ocr_min_label_confidence),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::InvalidThreshold {
                    name,
                    value: f64::from(value),
                });
            }
        }
        if !self.ocr_proximity.is_finite() || self.ocr_proximity < 0.0 {
            return Err(ConfigurationError::InvalidThreshold {
                name: "ocr_proximity",
                value: f64::from(self.ocr_proximity),
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON policy document. Missing fields take
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json).map_err(|e| ConfigurationError::PolicyParse {
            message: e.to_string(),
        })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reads a JSON policy file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for policy in [MatchPolicy::default(), MatchPolicy::strict(), MatchPolicy::relaxed()] {
            policy.validate().expect("valid preset");
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let policy = MatchPolicy::from_json_str(
            r#"{"correction_threshold": 0.8, "low_confidence": {"force_accept": {"confirmed": true}}}"#,
        )
        .expect("policy");
        assert_eq!(policy.correction_threshold, 0.8);
        assert_eq!(policy.fuzzy_threshold, DEFAULT_FUZZY_THRESHOLD);
        assert_eq!(
            policy.low_confidence,
            LowConfidencePolicy::ForceAccept { confirmed: true }
        );
        assert_eq!(policy.normalizer, NormalizerConfig::default());
    }

    #[test]
    fn unit_variant_parses_from_string() {
        let policy = MatchPolicy::from_json_str(r#"{"low_confidence": "remove"}"#).expect("policy");
        assert_eq!(policy.low_confidence, LowConfidencePolicy::Remove);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = MatchPolicy::from_json_str(r#"{"fuzzy_threshold": 1.5}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidThreshold { name: "fuzzy_threshold", .. }
        ));
        let err = MatchPolicy::from_json_str(r#"{"ocr_proximity": -1.0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidThreshold { name: "ocr_proximity", .. }
        ));
    }

    #[test]
    fn malformed_json_is_a_policy_error() {
        let err = MatchPolicy::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigurationError::PolicyParse { .. }));
    }
}
