//! Alias corpus: known name variants for canonical field names.
//!
//! Entries are scoped globally or per manufacturer/template. Lookups consult
//! the caller's scope first and fall back to the global table. The corpus is
//! append-only from the resolution side; see [`SharedAliasCorpus`] for the
//! single-writer handle used while requests are being served.

mod embedded;
pub mod loader;
mod shared;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ivr_model::{NormalizedName, canonical_form};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

pub use loader::{GLOBAL_FILE, SCOPES_DIR, load_dir, parse_entries};
pub use shared::SharedAliasCorpus;

/// Stable internal identifier for a data concept, e.g. `provider_npi`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalFieldName(String);

impl CanonicalFieldName {
    /// Normalizes `raw`; `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let form = canonical_form(raw);
        (!form.is_empty()).then_some(Self(form))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an alias applies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasScope {
    Global,
    /// A manufacturer or template identifier, stored lowercased.
    Scoped(String),
}

impl AliasScope {
    /// Scope for an identifier. Blank identifiers mean global.
    pub fn from_id(id: &str) -> Self {
        let id = id.trim().to_lowercase();
        if id.is_empty() || id == "global" {
            Self::Global
        } else {
            Self::Scoped(id)
        }
    }

    /// Scope for an optional caller-supplied identifier.
    pub fn from_option(id: Option<&str>) -> Self {
        id.map_or(Self::Global, Self::from_id)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => "global",
            Self::Scoped(id) => id,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for AliasScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One corpus row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AliasEntry {
    pub scope: AliasScope,
    pub canonical: CanonicalFieldName,
    /// Variant in normalized form.
    pub variant: String,
}

impl AliasEntry {
    /// Builds an entry from raw text, rejecting blank names.
    pub fn new(canonical: &str, variant: &str, scope: AliasScope) -> Result<Self> {
        let Some(canonical) = CanonicalFieldName::new(canonical) else {
            return Err(ConfigurationError::EmptyCanonicalName {
                scope: scope.to_string(),
                variant: variant.trim().to_string(),
            });
        };
        let variant = canonical_form(variant);
        if variant.is_empty() {
            return Err(ConfigurationError::EmptyVariant {
                scope: scope.to_string(),
                canonical: canonical.to_string(),
            });
        }
        Ok(Self {
            scope,
            canonical,
            variant,
        })
    }
}

/// Result of an idempotent [`AliasCorpus::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasUpdate {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ScopeTable {
    by_variant: BTreeMap<String, CanonicalFieldName>,
    by_canonical: BTreeMap<CanonicalFieldName, BTreeSet<String>>,
}

impl ScopeTable {
    fn get(&self, key: &str) -> Option<&CanonicalFieldName> {
        if let Some(canonical) = self.by_variant.get(key) {
            return Some(canonical);
        }
        self.by_canonical
            .get_key_value(key)
            .map(|(canonical, _)| canonical)
    }

    fn insert(&mut self, canonical: CanonicalFieldName, variant: String) {
        self.by_canonical
            .entry(canonical.clone())
            .or_default()
            .insert(variant.clone());
        self.by_variant.insert(variant, canonical);
    }

    fn len(&self) -> usize {
        self.by_variant.len()
    }
}

impl std::borrow::Borrow<str> for CanonicalFieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Table of canonical field names and their known variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasCorpus {
    tables: BTreeMap<AliasScope, ScopeTable>,
}

impl AliasCorpus {
    /// An empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// The global table compiled into the binary.
    pub fn builtin() -> Result<Self> {
        embedded::builtin()
    }

    /// Builds a corpus, failing on the first duplicate.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = AliasEntry>,
    {
        let mut corpus = Self::new();
        corpus.extend(entries)?;
        Ok(corpus)
    }

    /// Inserts entries strictly; see [`Self::insert`].
    pub fn extend<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = AliasEntry>,
    {
        for entry in entries {
            self.insert(entry)?;
        }
        Ok(())
    }

    /// Load-time insert. Any repeated variant within a scope is an error,
    /// even if it names the same canonical field.
    pub fn insert(&mut self, entry: AliasEntry) -> Result<()> {
        if let Some(existing) = self.existing(&entry) {
            return Err(duplicate(&entry, existing));
        }
        self.tables
            .entry(entry.scope)
            .or_default()
            .insert(entry.canonical, entry.variant);
        Ok(())
    }

    /// Runtime append. Re-adding an identical entry is a no-op; mapping a
    /// known variant to a different canonical name is rejected.
    pub fn append(&mut self, entry: AliasEntry) -> Result<AliasUpdate> {
        match self.existing(&entry) {
            Some(existing) if *existing == entry.canonical => Ok(AliasUpdate::AlreadyPresent),
            Some(existing) => Err(duplicate(&entry, existing)),
            None => {
                self.tables
                    .entry(entry.scope)
                    .or_default()
                    .insert(entry.canonical, entry.variant);
                Ok(AliasUpdate::Added)
            }
        }
    }

    /// Canonical name for a normalized source name.
    ///
    /// The scoped table is consulted before the global one. Within a table
    /// the full form is tried before the stem, and variants before canonical
    /// names.
    pub fn lookup(&self, name: &NormalizedName, scope: Option<&str>) -> Option<&CanonicalFieldName> {
        self.lookup_filtered(name, scope, |_| true)
    }

    /// Like [`lookup`](Self::lookup), but a hit on the stem only counts when
    /// `accept_stem_hit` approves the canonical name. Full-form hits are
    /// always taken.
    pub fn lookup_filtered<F>(
        &self,
        name: &NormalizedName,
        scope: Option<&str>,
        accept_stem_hit: F,
    ) -> Option<&CanonicalFieldName>
    where
        F: Fn(&CanonicalFieldName) -> bool,
    {
        self.tables_for(scope).into_iter().find_map(|table| {
            table.get(name.full()).or_else(|| {
                name.stripped()
                    .then(|| table.get(name.stem()))
                    .flatten()
                    .filter(|&canonical| accept_stem_hit(canonical))
            })
        })
    }

    /// All normalized variants of a canonical name visible from a scope.
    pub fn lookup_reverse(
        &self,
        canonical: &CanonicalFieldName,
        scope: Option<&str>,
    ) -> BTreeSet<&str> {
        self.tables_for(scope)
            .into_iter()
            .filter_map(|table| table.by_canonical.get(canonical))
            .flat_map(|variants| variants.iter().map(String::as_str))
            .collect()
    }

    /// Number of entries across all scopes.
    pub fn len(&self) -> usize {
        self.tables.values().map(ScopeTable::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scopes that hold at least one entry.
    pub fn scopes(&self) -> Vec<&AliasScope> {
        self.tables
            .iter()
            .filter(|(_, table)| table.len() > 0)
            .map(|(scope, _)| scope)
            .collect()
    }

    /// Every entry, sorted by scope, canonical name and variant.
    pub fn entries(&self) -> Vec<AliasEntry> {
        let mut entries: Vec<AliasEntry> = self
            .tables
            .iter()
            .flat_map(|(scope, table)| {
                table.by_variant.iter().map(|(variant, canonical)| AliasEntry {
                    scope: scope.clone(),
                    canonical: canonical.clone(),
                    variant: variant.clone(),
                })
            })
            .collect();
        entries.sort();
        entries
    }

    fn existing(&self, entry: &AliasEntry) -> Option<&CanonicalFieldName> {
        self.tables
            .get(&entry.scope)
            .and_then(|table| table.by_variant.get(&entry.variant))
    }

    fn tables_for(&self, scope: Option<&str>) -> Vec<&ScopeTable> {
        let scope = AliasScope::from_option(scope);
        let mut tables = Vec::with_capacity(2);
        if !scope.is_global()
            && let Some(table) = self.tables.get(&scope)
        {
            tables.push(table);
        }
        if let Some(table) = self.tables.get(&AliasScope::Global) {
            tables.push(table);
        }
        tables
    }
}

fn duplicate(entry: &AliasEntry, existing: &CanonicalFieldName) -> ConfigurationError {
    ConfigurationError::DuplicateAlias {
        scope: entry.scope.to_string(),
        variant: entry.variant.clone(),
        existing: existing.to_string(),
        attempted: entry.canonical.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ivr_model::Normalizer;

    fn entry(canonical: &str, variant: &str, scope: &str) -> AliasEntry {
        AliasEntry::new(canonical, variant, AliasScope::from_id(scope)).expect("valid entry")
    }

    fn corpus() -> AliasCorpus {
        AliasCorpus::from_entries([
            entry("provider_npi", "NPI Number", ""),
            entry("provider_npi", "Physician NPI", "MedLife"),
            entry("facility_name", "Practice Name", ""),
            entry("facility_name", "Clinic", "MedLife"),
        ])
        .expect("corpus")
    }

    #[test]
    fn scoped_entries_win_over_global() {
        let corpus = corpus();
        let normalizer = Normalizer::default();
        let name = normalizer.normalize("Clinic");
        assert_eq!(
            corpus.lookup(&name, Some("medlife")).map(CanonicalFieldName::as_str),
            Some("facility_name")
        );
        assert_eq!(corpus.lookup(&name, None), None);
        assert_eq!(corpus.lookup(&name, Some("Other")), None);
    }

    #[test]
    fn canonical_names_resolve_to_themselves() {
        let corpus = corpus();
        let name = Normalizer::default().normalize("provider_npi");
        let canonical = corpus.lookup(&name, Some("MedLife")).expect("canonical");
        assert_eq!(canonical.as_str(), "provider_npi");
        let variants = corpus.lookup_reverse(canonical, Some("MedLife"));
        assert_eq!(
            variants.into_iter().collect::<Vec<_>>(),
            vec!["npi_number", "physician_npi"]
        );
        let global_only = corpus.lookup_reverse(canonical, None);
        assert_eq!(global_only.len(), 1);
    }

    #[test]
    fn stem_lookup_after_full_form() {
        let corpus =
            AliasCorpus::from_entries([entry("date_of_birth", "dob", "")]).expect("corpus");
        let name = Normalizer::default().normalize("patient_dob");
        assert_eq!(
            corpus.lookup(&name, None).map(CanonicalFieldName::as_str),
            Some("date_of_birth")
        );
    }

    #[test]
    fn rejected_stem_hit_falls_through_to_global() {
        let corpus = AliasCorpus::from_entries([
            entry("patient_phone", "phone", "MedLife"),
            entry("office_phone", "phone", ""),
        ])
        .expect("corpus");
        let name = Normalizer::default().normalize("provider_phone");
        let hit = corpus.lookup_filtered(&name, Some("MedLife"), |canonical| {
            !canonical.as_str().starts_with("patient_")
        });
        assert_eq!(hit.map(CanonicalFieldName::as_str), Some("office_phone"));
        assert_eq!(
            corpus.lookup_filtered(&name, None, |_| false),
            None,
            "stem hits can be refused outright"
        );
        let full = Normalizer::default().normalize("phone");
        assert_eq!(
            corpus
                .lookup_filtered(&full, Some("MedLife"), |_| false)
                .map(CanonicalFieldName::as_str),
            Some("patient_phone")
        );
    }

    #[test]
    fn insert_rejects_any_repeat() {
        let mut corpus = corpus();
        let err = corpus
            .insert(entry("provider_npi", "npi number", "global"))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateAlias { .. }));
        assert_eq!(err.scope(), Some("global"));
    }

    #[test]
    fn append_is_idempotent_but_rejects_conflicts() {
        let mut corpus = corpus();
        let before = corpus.len();
        assert_eq!(
            corpus.append(entry("provider_npi", "Physician NPI", "MEDLIFE")).unwrap(),
            AliasUpdate::AlreadyPresent
        );
        assert_eq!(corpus.len(), before);
        assert_eq!(
            corpus.append(entry("provider_npi", "Doctor NPI", "MedLife")).unwrap(),
            AliasUpdate::Added
        );
        assert_eq!(corpus.len(), before + 1);
        let err = corpus
            .append(entry("facility_npi", "Doctor NPI", "MedLife"))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateAlias { .. }));
    }

    #[test]
    fn blank_rows_are_rejected() {
        assert!(matches!(
            AliasEntry::new("  ", "Physician NPI", AliasScope::Global),
            Err(ConfigurationError::EmptyCanonicalName { .. })
        ));
        assert!(matches!(
            AliasEntry::new("provider_npi", "--", AliasScope::Global),
            Err(ConfigurationError::EmptyVariant { .. })
        ));
    }

    #[test]
    fn entries_are_sorted_and_scopes_listed() {
        let corpus = corpus();
        let entries = corpus.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].scope, AliasScope::Global);
        assert_eq!(entries[0].canonical.as_str(), "facility_name");
        assert_eq!(
            corpus.scopes(),
            vec![&AliasScope::Global, &AliasScope::Scoped("medlife".to_string())]
        );
    }
}
