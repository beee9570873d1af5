//! Per-field resolution: exact, then alias, then fuzzy.

use std::collections::{BTreeMap, BTreeSet};

use ivr_model::{FieldMapping, NormalizedName, Normalizer, SourceField, TargetFieldCatalog};

use crate::corpus::AliasCorpus;
use crate::similarity::{self, RankedCandidate};

/// Normalized view of a target catalog, built once per resolution call.
#[derive(Debug)]
pub struct CatalogIndex<'c> {
    /// Distinct literal names in catalog order, with their normalized form.
    fields: Vec<(&'c str, NormalizedName)>,
    /// Full normalized form to literal name.
    by_full: BTreeMap<String, &'c str>,
}

impl<'c> CatalogIndex<'c> {
    pub fn new(catalog: &'c TargetFieldCatalog, normalizer: &Normalizer) -> Self {
        let mut seen = BTreeSet::new();
        let mut fields = Vec::with_capacity(catalog.len());
        let mut by_full: BTreeMap<String, &'c str> = BTreeMap::new();
        for name in catalog.names() {
            if !seen.insert(name) {
                continue;
            }
            let normalized = normalizer.normalize(name);
            match by_full.get(normalized.full()) {
                Some(existing) => {
                    tracing::warn!(
                        template_id = catalog.template_id.as_deref().unwrap_or(""),
                        first = %existing,
                        second = %name,
                        normalized = %normalized,
                        "Catalog fields normalize to the same name"
                    );
                    if name < *existing {
                        by_full.insert(normalized.full().to_string(), name);
                    }
                }
                None => {
                    by_full.insert(normalized.full().to_string(), name);
                }
            }
            fields.push((name, normalized));
        }
        Self { fields, by_full }
    }

    /// Literal name whose normalized form is exactly `full`.
    pub fn by_normalized(&self, full: &str) -> Option<&'c str> {
        self.by_full.get(full).copied()
    }

    /// Exact match on the unstripped form, else on the stripped stems.
    ///
    /// Stem matches carrying the source's own role prefix are preferred.
    /// When more than one stem match remains in that tier, the match is
    /// ambiguous and nothing is returned.
    pub fn exact(&self, source: &NormalizedName) -> Option<&'c str> {
        if let Some(name) = self.by_normalized(source.full()) {
            return Some(name);
        }
        let (same_role, other): (Vec<_>, Vec<_>) = self
            .fields
            .iter()
            .filter(|(_, target)| source.matches_after_strip(target))
            .partition(|(_, target)| target.prefix() == source.prefix());
        let tier = if same_role.is_empty() { other } else { same_role };
        match tier.as_slice() {
            [(name, _)] => Some(*name),
            [] => None,
            ambiguous => {
                tracing::debug!(
                    source = %source,
                    candidates = ambiguous.len(),
                    "Ambiguous stem match"
                );
                None
            }
        }
    }

    /// Fuzzy candidates.
    pub fn candidates(&self) -> impl Iterator<Item = (&'c str, &NormalizedName)> + '_ {
        self.fields.iter().map(|(name, normalized)| (*name, normalized))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Resolves source keys against a catalog.
///
/// Holds no state between calls; the corpus is only read.
#[derive(Debug, Clone, Copy)]
pub struct MappingResolver<'r> {
    corpus: &'r AliasCorpus,
    normalizer: &'r Normalizer,
    fuzzy_threshold: f32,
}

impl<'r> MappingResolver<'r> {
    pub fn new(corpus: &'r AliasCorpus, normalizer: &'r Normalizer, fuzzy_threshold: f32) -> Self {
        Self {
            corpus,
            normalizer,
            fuzzy_threshold,
        }
    }

    pub fn normalizer(&self) -> &'r Normalizer {
        self.normalizer
    }

    pub fn fuzzy_threshold(&self) -> f32 {
        self.fuzzy_threshold
    }

    /// One mapping per distinct source key, in input order. A repeated key
    /// keeps its first occurrence.
    pub fn resolve(
        &self,
        sources: &[SourceField],
        catalog: &TargetFieldCatalog,
        scope: Option<&str>,
    ) -> Vec<FieldMapping> {
        let index = CatalogIndex::new(catalog, self.normalizer);
        let mut seen = BTreeSet::new();
        sources
            .iter()
            .filter(|field| seen.insert(field.key.as_str()))
            .map(|field| self.resolve_key(&field.key, &index, scope))
            .collect()
    }

    /// Resolves a single key; stops at the first step that succeeds.
    pub fn resolve_key(&self, key: &str, index: &CatalogIndex<'_>, scope: Option<&str>) -> FieldMapping {
        let source = self.normalizer.normalize(key);

        let mapping = if let Some(target) = index.exact(&source) {
            FieldMapping::exact(key, target)
        } else if let Some(target) = self.alias_target(&source, index, scope) {
            FieldMapping::alias(key, target)
        } else if let Some(candidate) = self.fuzzy_candidate(&source, index) {
            FieldMapping::fuzzy(key, candidate.name, candidate.score)
        } else {
            FieldMapping::unresolved(key)
        };

        tracing::debug!(
            source_key = key,
            target = mapping.target_name.as_deref().unwrap_or(""),
            method = %mapping.method,
            confidence = mapping.confidence,
            "Resolved field"
        );
        mapping
    }

    /// Catalog field reached through the alias corpus.
    ///
    /// The canonical name itself is preferred over its variants; among
    /// variants the shortest literal wins, then the lexicographically
    /// smallest.
    pub fn alias_target<'c>(
        &self,
        source: &NormalizedName,
        index: &CatalogIndex<'c>,
        scope: Option<&str>,
    ) -> Option<&'c str> {
        let canonical = self.corpus.lookup_filtered(source, scope, |canonical| {
            source.roles_compatible(&self.normalizer.normalize(canonical.as_str()))
        })?;
        if let Some(target) = index.by_normalized(canonical.as_str()) {
            return Some(target);
        }
        self.corpus
            .lookup_reverse(canonical, scope)
            .into_iter()
            .filter_map(|variant| index.by_normalized(variant))
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
    }

    /// Top-ranked catalog field, if eligible. Fields carrying a different
    /// role prefix than the source are never candidates.
    pub fn fuzzy_candidate<'c>(
        &self,
        source: &NormalizedName,
        index: &'c CatalogIndex<'c>,
    ) -> Option<RankedCandidate<'c>> {
        let candidates = index
            .candidates()
            .filter(|(_, target)| source.roles_compatible(target));
        similarity::best_eligible(source, candidates, self.fuzzy_threshold)
    }

    /// Top-ranked role-compatible catalog field regardless of eligibility.
    pub fn best_candidate<'c>(
        &self,
        source: &NormalizedName,
        index: &'c CatalogIndex<'c>,
    ) -> Option<RankedCandidate<'c>> {
        let candidates = index
            .candidates()
            .filter(|(_, target)| source.roles_compatible(target));
        similarity::rank(source, candidates).into_iter().next()
    }
}
