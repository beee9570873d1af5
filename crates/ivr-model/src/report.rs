//! Aggregate output of one resolution call.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::TargetFieldCatalog;
use crate::confidence::{ConfidenceLevel, ConfidenceThresholds};
use crate::mapping::{CorrectionRecord, FieldMapping, MatchMethod, RemovalRecord};

/// Summary counts over a [`MappingReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSummary {
    /// Number of mapping entries (one per source field).
    pub total: usize,
    pub exact: usize,
    pub alias: usize,
    pub fuzzy: usize,
    pub unresolved: usize,
    pub accepted: usize,
    pub corrected: usize,
    pub removed: usize,
    /// Required fields in the catalog.
    pub required_total: usize,
    /// Required fields targeted by an accepted mapping.
    pub required_mapped: usize,
    pub ocr_verified: usize,
    pub ocr_diverged: usize,
}

/// Immutable result of resolving one source record against one catalog.
///
/// Later passes (OCR reconciliation) build a new report through
/// [`MappingReport::with_mappings`] instead of mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingReport {
    scope: Option<String>,
    template_id: Option<String>,
    mappings: Vec<FieldMapping>,
    corrections: Vec<CorrectionRecord>,
    removals: Vec<RemovalRecord>,
    required_fields: Vec<String>,
    summary: MappingSummary,
}

impl MappingReport {
    pub fn new(
        catalog: &TargetFieldCatalog,
        scope: Option<&str>,
        mappings: Vec<FieldMapping>,
        corrections: Vec<CorrectionRecord>,
        removals: Vec<RemovalRecord>,
    ) -> Self {
        let required_fields = catalog.required_names();
        let summary = summarize(&mappings, &corrections, &removals, &required_fields);
        Self {
            scope: scope.map(str::to_string),
            template_id: catalog.template_id.clone(),
            mappings,
            corrections,
            removals,
            required_fields,
            summary,
        }
    }

    /// A new report with replaced mappings and recomputed counts; corrections,
    /// removals and catalog facts are carried over.
    #[must_use]
    pub fn with_mappings(&self, mappings: Vec<FieldMapping>) -> Self {
        let summary = summarize(
            &mappings,
            &self.corrections,
            &self.removals,
            &self.required_fields,
        );
        Self {
            scope: self.scope.clone(),
            template_id: self.template_id.clone(),
            mappings,
            corrections: self.corrections.clone(),
            removals: self.removals.clone(),
            required_fields: self.required_fields.clone(),
            summary,
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn corrections(&self) -> &[CorrectionRecord] {
        &self.corrections
    }

    pub fn removals(&self) -> &[RemovalRecord] {
        &self.removals
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn summary(&self) -> &MappingSummary {
        &self.summary
    }

    /// Mapping entry for a source key.
    pub fn mapping_for(&self, source_key: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.source_key == source_key)
    }

    /// Required catalog fields no accepted mapping targets.
    pub fn missing_required(&self) -> Vec<&str> {
        let mapped = self.accepted_targets();
        self.required_fields
            .iter()
            .map(String::as_str)
            .filter(|name| !mapped.contains(name))
            .collect()
    }

    /// Target names claimed by more than one accepted mapping, with the
    /// claiming source keys in report order.
    pub fn duplicate_targets(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut claims: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for mapping in &self.mappings {
            if let Some(target) = mapping.accepted_target() {
                claims
                    .entry(target)
                    .or_default()
                    .push(mapping.source_key.as_str());
            }
        }
        claims.retain(|_, keys| keys.len() > 1);
        claims
    }

    /// Accepted mappings with the divergence flag set.
    pub fn diverged(&self) -> Vec<&FieldMapping> {
        self.mappings.iter().filter(|m| m.divergence_flag()).collect()
    }

    /// Count of resolved mappings at each confidence level.
    #[must_use]
    pub fn count_by_level(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, usize> {
        let mut counts = BTreeMap::new();
        for mapping in self.mappings.iter().filter(|m| m.is_resolved()) {
            if let Some(level) = thresholds.categorize(mapping.confidence) {
                *counts.entry(level).or_insert(0) += 1;
            }
        }
        counts
    }

    /// True if a removal happened or a required field is left unmapped.
    pub fn needs_attention(&self) -> bool {
        !self.removals.is_empty() || self.summary.required_mapped < self.summary.required_total
    }

    fn accepted_targets(&self) -> BTreeSet<&str> {
        self.mappings
            .iter()
            .filter_map(FieldMapping::accepted_target)
            .collect()
    }
}

fn summarize(
    mappings: &[FieldMapping],
    corrections: &[CorrectionRecord],
    removals: &[RemovalRecord],
    required_fields: &[String],
) -> MappingSummary {
    let mut summary = MappingSummary {
        total: mappings.len(),
        corrected: corrections.len(),
        removed: removals.len(),
        required_total: required_fields.len(),
        ..MappingSummary::default()
    };
    for mapping in mappings {
        match mapping.method {
            MatchMethod::Exact => summary.exact += 1,
            MatchMethod::Alias => summary.alias += 1,
            MatchMethod::Fuzzy => summary.fuzzy += 1,
            MatchMethod::Unresolved => summary.unresolved += 1,
        }
        if mapping.accepted {
            summary.accepted += 1;
        }
        if mapping.ocr.is_verified() {
            summary.ocr_verified += 1;
        }
        if mapping.ocr.divergence_flag() {
            summary.ocr_diverged += 1;
        }
    }
    let accepted: BTreeSet<&str> = mappings
        .iter()
        .filter_map(FieldMapping::accepted_target)
        .collect();
    summary.required_mapped = required_fields
        .iter()
        .filter(|name| accepted.contains(name.as_str()))
        .count();
    summary
}
