//! Field name normalization.
//!
//! Internal keys (`patient_name`), form labels (`Patient Name`) and OCR text
//! (`PATIENT  NAME:`) all reduce to the same underscore-separated token form
//! so they can be compared directly.

use serde::{Deserialize, Serialize};

/// Role prefixes stripped by default.
pub const DEFAULT_PREFIXES: [&str; 4] = ["patient", "provider", "physician", "facility"];

/// Decorative suffixes stripped by default.
pub const DEFAULT_SUFFIXES: [&str; 2] = ["field", "input"];

/// Affixes the [`Normalizer`] strips from the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Leading tokens naming a role (e.g. `patient`).
    pub prefixes: Vec<String>,
    /// Trailing tokens that carry no meaning (e.g. `field`).
    pub suffixes: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl NormalizerConfig {
    /// A config that never strips anything.
    #[must_use]
    pub fn no_affixes() -> Self {
        Self {
            prefixes: Vec::new(),
            suffixes: Vec::new(),
        }
    }
}

/// A name reduced to comparable token form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NormalizedName {
    full: String,
    stem: String,
    prefix: Option<String>,
    suffix: Option<String>,
}

impl NormalizedName {
    /// The canonical form before any affix stripping.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// The canonical form after affix stripping. Equal to [`Self::full`]
    /// when nothing was stripped.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// The stripped role prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The stripped suffix, if any.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// True if a prefix or suffix was removed.
    pub fn stripped(&self) -> bool {
        self.prefix.is_some() || self.suffix.is_some()
    }

    /// The full form with separators removed, used for similarity scoring.
    pub fn compact(&self) -> String {
        self.full.replace('_', "")
    }

    /// True if both names carry no conflicting role prefix.
    ///
    /// `patient_name` and `name` are compatible; `patient_name` and
    /// `provider_name` are not.
    pub fn roles_compatible(&self, other: &NormalizedName) -> bool {
        match (&self.prefix, &other.prefix) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// True if the stems match after stripping and at least one side was
    /// actually stripped.
    pub fn matches_after_strip(&self, other: &NormalizedName) -> bool {
        (self.stripped() || other.stripped())
            && !self.stem.is_empty()
            && self.stem == other.stem
            && self.roles_compatible(other)
    }
}

impl std::fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

/// Canonicalizes raw names into [`NormalizedName`]s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

impl Normalizer {
    /// Creates a normalizer from a config. Affixes are canonicalized
    /// themselves, so `"Patient"` and `"patient_"` are equivalent.
    pub fn new(config: &NormalizerConfig) -> Self {
        let clean = |items: &[String]| -> Vec<String> {
            let mut out: Vec<String> = items
                .iter()
                .map(|item| canonical_form(item.as_str()))
                .filter(|item| !item.is_empty())
                .collect();
            // Longest first so `patient_info` wins over `patient`.
            out.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            out.dedup();
            out
        };
        Self {
            prefixes: clean(&config.prefixes),
            suffixes: clean(&config.suffixes),
        }
    }

    /// Normalizes a raw field name or label.
    pub fn normalize(&self, raw: &str) -> NormalizedName {
        let full = canonical_form(raw);
        let mut stem = full.as_str();

        let mut prefix = None;
        for candidate in &self.prefixes {
            if let Some(rest) = stem
                .strip_prefix(candidate.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                && !rest.is_empty()
            {
                prefix = Some(candidate.clone());
                stem = rest;
                break;
            }
        }

        let mut suffix = None;
        for candidate in &self.suffixes {
            if let Some(rest) = stem
                .strip_suffix(candidate.as_str())
                .and_then(|rest| rest.strip_suffix('_'))
                && !rest.is_empty()
            {
                suffix = Some(candidate.clone());
                stem = rest;
                break;
            }
        }

        let stem = stem.to_string();
        NormalizedName {
            full,
            stem,
            prefix,
            suffix,
        }
    }
}

/// Lowercases, trims and collapses every run of separators into one
/// underscore. Apostrophes are dropped rather than treated as separators.
pub fn canonical_form(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        if ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}
