//! The three entry points the calling system uses.

use std::collections::{BTreeMap, BTreeSet};

use ivr_model::{
    FieldMapping, MappingReport, Normalizer, OcrExtractionResult, SourceField,
    TargetFieldCatalog,
};
use tracing::{debug, info, info_span, warn};

use crate::corpus::{AliasCorpus, AliasEntry, AliasScope, AliasUpdate, SharedAliasCorpus};
use crate::error::Result;
use crate::ocr::OcrReconciler;
use crate::policy::MatchPolicy;
use crate::resolver::{CatalogIndex, MappingResolver};
use crate::validator::MappingValidator;

/// Resolution and validation over a shared alias corpus.
///
/// Cloning is cheap and clones share the corpus, so one engine can serve
/// concurrent requests from several threads.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    corpus: SharedAliasCorpus,
    policy: MatchPolicy,
    normalizer: Normalizer,
}

impl MappingEngine {
    /// Creates an engine after validating the policy.
    pub fn new(corpus: impl Into<SharedAliasCorpus>, policy: MatchPolicy) -> Result<Self> {
        policy.validate()?;
        let normalizer = Normalizer::new(&policy.normalizer);
        Ok(Self {
            corpus: corpus.into(),
            policy,
            normalizer,
        })
    }

    /// An engine over the built-in global alias table.
    pub fn with_builtin_corpus(policy: MatchPolicy) -> Result<Self> {
        Self::new(AliasCorpus::builtin()?, policy)
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn corpus(&self) -> &SharedAliasCorpus {
        &self.corpus
    }

    /// Resolves every source field and validates the result against the
    /// catalog.
    ///
    /// An accepted stored mapping for a source key is validated in place of
    /// fresh resolution. Every distinct source key ends up with exactly one
    /// mapping entry; a key whose stored mapping was removed is reported as
    /// unresolved.
    pub fn resolve_and_validate(
        &self,
        sources: &[SourceField],
        catalog: &TargetFieldCatalog,
        scope: Option<&str>,
        stored: Option<&[FieldMapping]>,
    ) -> Result<MappingReport> {
        let span = info_span!(
            "resolve_and_validate",
            scope = scope.unwrap_or(""),
            template_id = catalog.template_id.as_deref().unwrap_or(""),
            sources = sources.len(),
            targets = catalog.len()
        );
        let _guard = span.enter();

        let corpus = self.corpus.read()?;
        let resolver = MappingResolver::new(&corpus, &self.normalizer, self.policy.fuzzy_threshold);
        let validator = MappingValidator::new(
            resolver,
            self.policy.correction_threshold,
            self.policy.low_confidence,
        );
        let index = CatalogIndex::new(catalog, &self.normalizer);

        let stored = stored_by_key(stored.unwrap_or_default(), sources);

        let mut seen = BTreeSet::new();
        let keys: Vec<&str> = sources
            .iter()
            .map(|field| field.key.as_str())
            .filter(|key| seen.insert(*key))
            .collect();

        let candidates: Vec<FieldMapping> = keys
            .iter()
            .map(|key| match stored.get(key) {
                Some(mapping) => {
                    debug!(
                        source_key = *key,
                        target = mapping.target_name.as_deref().unwrap_or(""),
                        "Using stored mapping"
                    );
                    FieldMapping {
                        ocr: Default::default(),
                        ..(*mapping).clone()
                    }
                }
                None => resolver.resolve_key(key, &index, scope),
            })
            .collect();

        let outcome = validator.validate(&candidates, catalog, scope);
        let mut valid: BTreeMap<String, FieldMapping> = outcome
            .valid
            .into_iter()
            .map(|mapping| (mapping.source_key.clone(), mapping))
            .collect();
        let mappings: Vec<FieldMapping> = keys
            .iter()
            .map(|key| {
                valid
                    .remove(*key)
                    .unwrap_or_else(|| FieldMapping::unresolved(*key))
            })
            .collect();

        let report = MappingReport::new(
            catalog,
            scope,
            mappings,
            outcome.corrections,
            outcome.removals,
        );
        let summary = report.summary();
        info!(
            exact = summary.exact,
            alias = summary.alias,
            fuzzy = summary.fuzzy,
            unresolved = summary.unresolved,
            corrected = summary.corrected,
            removed = summary.removed,
            "Resolution complete"
        );
        Ok(report)
    }

    /// Annotates a report with OCR verdicts. Targets and acceptance are
    /// carried over unchanged.
    pub fn reconcile_with_ocr(
        &self,
        report: &MappingReport,
        ocr: &OcrExtractionResult,
    ) -> MappingReport {
        let span = info_span!(
            "reconcile_with_ocr",
            template_id = report.template_id().unwrap_or(""),
            labels = ocr.labels.len(),
            anchors = ocr.anchors.len()
        );
        let _guard = span.enter();

        let reconciler = OcrReconciler::new(&self.normalizer, &self.policy);
        let reconciled = report.with_mappings(reconciler.reconcile(report.mappings(), ocr));
        info!(
            verified = reconciled.summary().ocr_verified,
            diverged = reconciled.summary().ocr_diverged,
            "OCR reconciliation complete"
        );
        reconciled
    }

    /// Appends a learned alias. Re-adding a known alias is a no-op.
    pub fn update_alias_corpus(
        &self,
        canonical: &str,
        variant: &str,
        scope: Option<&str>,
    ) -> Result<AliasUpdate> {
        let entry = AliasEntry::new(canonical, variant, AliasScope::from_option(scope))?;
        let scope = entry.scope.to_string();
        let canonical = entry.canonical.to_string();
        let normalized_variant = entry.variant.clone();
        let update = self.corpus.append(entry)?;
        info!(
            %scope,
            %canonical,
            variant = %normalized_variant,
            ?update,
            "Alias corpus updated"
        );
        Ok(update)
    }
}

/// Accepted, consistent stored mappings for keys present in the sources,
/// first occurrence per key. Keys without one are resolved fresh.
fn stored_by_key<'m>(
    stored: &'m [FieldMapping],
    sources: &[SourceField],
) -> BTreeMap<&'m str, &'m FieldMapping> {
    let keys: BTreeSet<&str> = sources.iter().map(|field| field.key.as_str()).collect();
    let mut by_key = BTreeMap::new();
    for mapping in stored {
        if !mapping.is_consistent() {
            warn!(
                source_key = %mapping.source_key,
                method = %mapping.method,
                confidence = mapping.confidence,
                "Ignoring inconsistent stored mapping"
            );
            continue;
        }
        if mapping.accepted_target().is_none() {
            debug!(source_key = %mapping.source_key, "Ignoring stored mapping that is not accepted");
            continue;
        }
        if !keys.contains(mapping.source_key.as_str()) {
            debug!(source_key = %mapping.source_key, "Ignoring stored mapping for absent source field");
            continue;
        }
        by_key.entry(mapping.source_key.as_str()).or_insert(mapping);
    }
    by_key
}

#[cfg(test)]
mod tests {
    use ivr_model::MatchMethod;

    use super::*;

    #[test]
    fn invalid_policy_is_rejected() {
        let policy = MatchPolicy {
            fuzzy_threshold: 2.0,
            ..MatchPolicy::default()
        };
        assert!(MappingEngine::new(AliasCorpus::new(), policy).is_err());
    }

    #[test]
    fn stored_mapping_for_absent_key_is_ignored() {
        let engine = MappingEngine::new(AliasCorpus::new(), MatchPolicy::default()).expect("engine");
        let catalog = TargetFieldCatalog::from_names(["Patient Name"]);
        let report = engine
            .resolve_and_validate(
                &[SourceField::new("patient_name", "John Doe")],
                &catalog,
                None,
                Some(&[FieldMapping::manual("facility_name", "Nowhere")]),
            )
            .expect("report");
        assert_eq!(report.mappings().len(), 1);
        assert!(report.removals().is_empty());
        assert_eq!(report.mappings()[0].method, MatchMethod::Exact);
    }

    #[test]
    fn builtin_engine_resolves_common_aliases() {
        let engine = MappingEngine::with_builtin_corpus(MatchPolicy::default()).expect("engine");
        let catalog = TargetFieldCatalog::from_names(["Physician NPI", "Date of Birth"]);
        let report = engine
            .resolve_and_validate(
                &[
                    SourceField::new("provider_npi", "1234567890"),
                    SourceField::new("patient_dob", "1950-01-01"),
                ],
                &catalog,
                Some("ACZ"),
                None,
            )
            .expect("report");
        assert_eq!(report.mappings()[0].method, MatchMethod::Alias);
        assert_eq!(report.mappings()[1].target_name.as_deref(), Some("Date of Birth"));
    }
}
