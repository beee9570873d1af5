//! OCR evidence extracted from the rendered form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::name::canonical_form;

/// Axis-aligned box on one page of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Zero-based page index.
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(page: u32, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            page,
            x,
            y,
            width,
            height,
        }
    }

    /// Grows the box by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            page: self.page,
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// True if both boxes are on the same page and overlap (touching counts).
    pub fn intersects(&self, other: &Region) -> bool {
        self.page == other.page
            && self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

/// A label read from the document image or text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLabel {
    /// Text as read.
    pub raw_text: String,
    /// Canonical form of `raw_text`; recomputed when empty.
    #[serde(default)]
    pub normalized_text: String,
    /// Recognition confidence reported by the OCR collaborator (0.0 to 1.0).
    #[serde(default = "full_confidence")]
    pub bounding_confidence: f32,
    /// Where the label sits, when the OCR collaborator reports positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

fn full_confidence() -> f32 {
    1.0
}

impl OcrLabel {
    pub fn new(raw_text: impl Into<String>, bounding_confidence: f32) -> Self {
        let raw_text = raw_text.into();
        Self {
            normalized_text: canonical_form(&raw_text),
            raw_text,
            bounding_confidence,
            region: None,
        }
    }

    #[must_use]
    pub fn at(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// The text to compare against, falling back to `raw_text`.
    pub fn comparable_text(&self) -> &str {
        if self.normalized_text.trim().is_empty() {
            &self.raw_text
        } else {
            &self.normalized_text
        }
    }
}

/// Everything an OCR pass produced for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrExtractionResult {
    #[serde(default)]
    pub labels: Vec<OcrLabel>,
    /// Expected position of each target field, keyed by verbatim field name.
    #[serde(default)]
    pub anchors: BTreeMap<String, Region>,
}

impl OcrExtractionResult {
    pub fn new(labels: Vec<OcrLabel>) -> Self {
        Self {
            labels,
            anchors: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, target_name: impl Into<String>, region: Region) -> Self {
        self.anchors.insert(target_name.into(), region);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// True if at least one label at or above `min_confidence` carries a
    /// position.
    pub fn has_positions(&self, min_confidence: f32) -> bool {
        self.labels
            .iter()
            .any(|label| label.region.is_some() && label.bounding_confidence >= min_confidence)
    }
}

/// Why OCR evidence disagrees with a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceCause {
    /// The closest label is below the divergence threshold.
    LowSimilarity,
    /// No label was found near the field's expected position.
    NoLabelNearPosition,
}

/// Advisory OCR outcome for one mapping.
///
/// `NotChecked` (no evidence) and `Verified` are distinct states; both have a
/// false divergence flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OcrVerdict {
    #[default]
    NotChecked,
    Verified {
        label: String,
        similarity: f32,
    },
    Diverged {
        nearest_label: Option<String>,
        similarity: f32,
        cause: DivergenceCause,
    },
}

impl OcrVerdict {
    pub fn divergence_flag(&self) -> bool {
        matches!(self, Self::Diverged { .. })
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    pub fn is_checked(&self) -> bool {
        !matches!(self, Self::NotChecked)
    }
}
