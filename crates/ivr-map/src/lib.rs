//! Field mapping resolution and validation for IVR forms.
//!
//! Source fields from the order workflow are mapped onto the fields a
//! manufacturer's form actually exposes. Each source key goes through
//! exact, alias and fuzzy matching in that order; stored mappings are
//! checked against the current catalog and corrected or removed; OCR labels
//! from the rendered document can then flag mappings that look wrong.
//!
//! [`MappingEngine`] is the entry point. Only configuration problems are
//! errors; everything else is reported in the [`MappingReport`].

#![deny(unsafe_code)]

pub mod corpus;
pub mod engine;
pub mod error;
pub mod ocr;
pub mod policy;
pub mod resolver;
pub mod similarity;
pub mod validator;

pub use corpus::{
    AliasCorpus, AliasEntry, AliasScope, AliasUpdate, CanonicalFieldName, SharedAliasCorpus,
};
pub use engine::MappingEngine;
pub use error::{ConfigurationError, Result};
pub use ivr_model::MappingReport;
pub use ocr::OcrReconciler;
pub use policy::{LowConfidencePolicy, MatchPolicy};
pub use resolver::{CatalogIndex, MappingResolver};
pub use similarity::{DEFAULT_FUZZY_THRESHOLD, MIN_ABSOLUTE_THRESHOLD, RankedCandidate};
pub use validator::{MappingValidator, ValidationOutcome};
