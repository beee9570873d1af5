//! Data model for IVR form field mapping.
//!
//! Source fields come from the order workflow, target fields from the form
//! template service, and OCR labels from the rendered document. The mapping
//! engine in `ivr-map` turns them into a [`MappingReport`].

pub mod catalog;
pub mod confidence;
pub mod mapping;
pub mod name;
pub mod ocr;
pub mod report;
pub mod source;

pub use catalog::{FieldType, TargetField, TargetFieldCatalog};
pub use confidence::{ConfidenceLevel, ConfidenceThresholds};
pub use mapping::{
    ALIAS_CONFIDENCE, CorrectionReason, CorrectionRecord, EXACT_CONFIDENCE, FieldMapping,
    MAX_FUZZY_CONFIDENCE, MatchMethod, RemovalReason, RemovalRecord, fuzzy_confidence,
};
pub use name::{NormalizedName, Normalizer, NormalizerConfig, canonical_form};
pub use ocr::{DivergenceCause, OcrExtractionResult, OcrLabel, OcrVerdict, Region};
pub use report::{MappingReport, MappingSummary};
pub use source::{SourceField, SourceValue, ValueType};
