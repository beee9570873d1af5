//! Checks mappings against the current catalog and repairs stale targets.

use ivr_model::{
    ALIAS_CONFIDENCE, CorrectionReason, CorrectionRecord, FieldMapping, MatchMethod,
    RemovalReason, RemovalRecord, TargetFieldCatalog, fuzzy_confidence,
};

use crate::policy::LowConfidencePolicy;
use crate::resolver::{CatalogIndex, MappingResolver};

/// Mappings that survived validation plus the audit trail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    /// Structurally valid mappings, including corrected ones, in input order.
    pub valid: Vec<FieldMapping>,
    pub corrections: Vec<CorrectionRecord>,
    pub removals: Vec<RemovalRecord>,
}

impl ValidationOutcome {
    /// True if nothing was corrected or removed.
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty() && self.removals.is_empty()
    }
}

/// A re-resolution candidate for a stale target.
struct Replacement<'c> {
    target: &'c str,
    method: MatchMethod,
    confidence: f32,
}

/// Validates mappings against the authoritative catalog.
#[derive(Debug, Clone, Copy)]
pub struct MappingValidator<'r> {
    resolver: MappingResolver<'r>,
    correction_threshold: f32,
    low_confidence: LowConfidencePolicy,
}

impl<'r> MappingValidator<'r> {
    pub fn new(
        resolver: MappingResolver<'r>,
        correction_threshold: f32,
        low_confidence: LowConfidencePolicy,
    ) -> Self {
        Self {
            resolver,
            correction_threshold,
            low_confidence,
        }
    }

    /// Splits mappings into valid ones, corrections and removals.
    ///
    /// A mapping is valid when its target appears verbatim in the catalog.
    /// Unresolved mappings reference nothing and pass through unchanged.
    pub fn validate(
        &self,
        mappings: &[FieldMapping],
        catalog: &TargetFieldCatalog,
        scope: Option<&str>,
    ) -> ValidationOutcome {
        let index = CatalogIndex::new(catalog, self.resolver.normalizer());
        let mut outcome = ValidationOutcome::default();

        for mapping in mappings {
            let Some(stale) = mapping.target_name.as_deref() else {
                outcome.valid.push(mapping.clone());
                continue;
            };
            if catalog.contains(stale) {
                outcome.valid.push(mapping.clone());
                continue;
            }
            if !mapping.accepted {
                tracing::info!(
                    source_key = %mapping.source_key,
                    target = stale,
                    "Removed unaccepted mapping to unknown field"
                );
                outcome.removals.push(RemovalRecord {
                    source_key: mapping.source_key.clone(),
                    invalid_target_name: stale.to_string(),
                    reason: RemovalReason::NotAccepted,
                    best_candidate: None,
                    best_confidence: None,
                });
                continue;
            }
            self.repair(mapping, stale, &index, scope, &mut outcome);
        }

        outcome
    }

    fn repair(
        &self,
        mapping: &FieldMapping,
        stale: &str,
        index: &CatalogIndex<'_>,
        scope: Option<&str>,
        outcome: &mut ValidationOutcome,
    ) {
        let normalizer = self.resolver.normalizer();
        let stale_name = normalizer.normalize(stale);
        let key_name = normalizer.normalize(&mapping.source_key);

        let alias = self
            .resolver
            .alias_target(&stale_name, index, scope)
            .or_else(|| self.resolver.alias_target(&key_name, index, scope));
        let replacement = match alias {
            Some(target) => Some(Replacement {
                target,
                method: MatchMethod::Alias,
                confidence: ALIAS_CONFIDENCE,
            }),
            None => self
                .resolver
                .fuzzy_candidate(&stale_name, index)
                .map(|candidate| Replacement {
                    target: candidate.name,
                    method: MatchMethod::Fuzzy,
                    confidence: fuzzy_confidence(candidate.score),
                }),
        };

        let Some(replacement) = replacement else {
            let best = self.resolver.best_candidate(&stale_name, index);
            self.remove(
                mapping,
                stale,
                RemovalReason::NoEligibleCandidate,
                best.as_ref().map(|c| (c.name, c.score)),
                outcome,
            );
            return;
        };

        if replacement.confidence >= self.correction_threshold {
            let reason = match replacement.method {
                MatchMethod::Alias => CorrectionReason::AliasMatch,
                _ => CorrectionReason::FuzzyMatch,
            };
            self.correct(mapping, stale, &replacement, reason, outcome);
            return;
        }

        let best = Some((replacement.target, replacement.confidence));
        match self.low_confidence {
            LowConfidencePolicy::Remove => self.remove(
                mapping,
                stale,
                RemovalReason::BelowCorrectionThreshold,
                best,
                outcome,
            ),
            LowConfidencePolicy::ForceAccept { confirmed: true } => self.correct(
                mapping,
                stale,
                &replacement,
                CorrectionReason::ForcedBelowThreshold,
                outcome,
            ),
            LowConfidencePolicy::ForceAccept { confirmed: false } => self.remove(
                mapping,
                stale,
                RemovalReason::LowConfidenceOverrideRejected,
                best,
                outcome,
            ),
        }
    }

    fn correct(
        &self,
        mapping: &FieldMapping,
        stale: &str,
        replacement: &Replacement<'_>,
        reason: CorrectionReason,
        outcome: &mut ValidationOutcome,
    ) {
        tracing::info!(
            source_key = %mapping.source_key,
            from = stale,
            to = replacement.target,
            confidence = replacement.confidence,
            ?reason,
            "Corrected stale mapping"
        );
        outcome.corrections.push(CorrectionRecord {
            source_key: mapping.source_key.clone(),
            original_target_name: stale.to_string(),
            corrected_target_name: replacement.target.to_string(),
            method: replacement.method,
            confidence: replacement.confidence,
            reason,
        });
        outcome.valid.push(FieldMapping::matched(
            mapping.source_key.clone(),
            replacement.target,
            replacement.method,
            replacement.confidence,
        ));
    }

    fn remove(
        &self,
        mapping: &FieldMapping,
        stale: &str,
        reason: RemovalReason,
        best: Option<(&str, f32)>,
        outcome: &mut ValidationOutcome,
    ) {
        tracing::info!(
            source_key = %mapping.source_key,
            target = stale,
            ?reason,
            best_confidence = best.map(|(_, score)| score),
            "Removed stale mapping"
        );
        outcome.removals.push(RemovalRecord {
            source_key: mapping.source_key.clone(),
            invalid_target_name: stale.to_string(),
            reason,
            best_candidate: best.map(|(name, _)| name.to_string()),
            best_confidence: best.map(|(_, score)| score),
        });
    }
}
