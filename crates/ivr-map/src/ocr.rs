//! Cross-checks accepted mappings against OCR-extracted labels.
//!
//! OCR evidence is advisory. Reconciliation only ever sets the `ocr`
//! verdict; target names and acceptance are never touched.

use std::cmp::Ordering;

use ivr_model::{
    DivergenceCause, FieldMapping, NormalizedName, Normalizer, OcrExtractionResult, OcrLabel,
    OcrVerdict, Region,
};

use crate::policy::MatchPolicy;
use crate::similarity;

/// A label normalized once per reconciliation call.
struct PreparedLabel<'o> {
    label: &'o OcrLabel,
    normalized: NormalizedName,
}

/// Best label for a target, with its similarity.
struct LabelMatch<'o> {
    label: &'o OcrLabel,
    similarity: f32,
}

/// Annotates mappings with OCR verdicts.
#[derive(Debug, Clone, Copy)]
pub struct OcrReconciler<'r> {
    normalizer: &'r Normalizer,
    divergence_threshold: f32,
    proximity: f32,
    min_label_confidence: f32,
}

impl<'r> OcrReconciler<'r> {
    pub fn new(normalizer: &'r Normalizer, policy: &MatchPolicy) -> Self {
        Self {
            normalizer,
            divergence_threshold: policy.divergence_threshold,
            proximity: policy.ocr_proximity,
            min_label_confidence: policy.ocr_min_label_confidence,
        }
    }

    /// Returns the mappings with fresh verdicts, in the same order.
    ///
    /// Without usable labels every mapping is `NotChecked`.
    pub fn reconcile(&self, mappings: &[FieldMapping], ocr: &OcrExtractionResult) -> Vec<FieldMapping> {
        let labels: Vec<PreparedLabel<'_>> = ocr
            .labels
            .iter()
            .filter(|label| label.bounding_confidence >= self.min_label_confidence)
            .map(|label| PreparedLabel {
                label,
                normalized: self.normalizer.normalize(label.comparable_text()),
            })
            .collect();
        let positional = ocr.has_positions(self.min_label_confidence);

        mappings
            .iter()
            .map(|mapping| {
                let mut reconciled = mapping.clone();
                reconciled.ocr = match mapping.accepted_target() {
                    Some(target) if !labels.is_empty() => {
                        let anchor = positional.then(|| ocr.anchors.get(target)).flatten();
                        self.verdict(target, anchor, &labels)
                    }
                    _ => OcrVerdict::NotChecked,
                };
                if reconciled.ocr.divergence_flag() {
                    tracing::info!(
                        source_key = %mapping.source_key,
                        target = mapping.target_name.as_deref().unwrap_or(""),
                        verdict = ?reconciled.ocr,
                        "OCR evidence diverges from mapping"
                    );
                }
                reconciled
            })
            .collect()
    }

    fn verdict(&self, target: &str, anchor: Option<&Region>, labels: &[PreparedLabel<'_>]) -> OcrVerdict {
        let target = self.normalizer.normalize(target);

        if let Some(anchor) = anchor {
            let area = anchor.expanded(self.proximity);
            let near = labels.iter().filter(|prepared| {
                prepared
                    .label
                    .region
                    .is_some_and(|region| region.intersects(&area))
            });
            let Some(best) = best_match(&target, near) else {
                let nearest = best_match(&target, labels.iter());
                return OcrVerdict::Diverged {
                    nearest_label: nearest.as_ref().map(|m| m.label.raw_text.clone()),
                    similarity: nearest.map_or(0.0, |m| m.similarity),
                    cause: DivergenceCause::NoLabelNearPosition,
                };
            };
            return self.judge(best);
        }

        match best_match(&target, labels.iter()) {
            Some(best) => self.judge(best),
            None => OcrVerdict::NotChecked,
        }
    }

    fn judge(&self, best: LabelMatch<'_>) -> OcrVerdict {
        if best.similarity >= self.divergence_threshold {
            OcrVerdict::Verified {
                label: best.label.raw_text.clone(),
                similarity: best.similarity,
            }
        } else {
            OcrVerdict::Diverged {
                nearest_label: Some(best.label.raw_text.clone()),
                similarity: best.similarity,
                cause: DivergenceCause::LowSimilarity,
            }
        }
    }
}

/// Highest similarity wins, then higher recognition confidence, then the
/// lexicographically smaller raw text.
fn best_match<'o, 'p, I>(target: &NormalizedName, labels: I) -> Option<LabelMatch<'o>>
where
    'o: 'p,
    I: Iterator<Item = &'p PreparedLabel<'o>>,
{
    labels
        .map(|prepared| LabelMatch {
            label: prepared.label,
            similarity: similarity::score(target, &prepared.normalized),
        })
        .min_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.label
                        .bounding_confidence
                        .partial_cmp(&a.label.bounding_confidence)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.label.raw_text.cmp(&b.label.raw_text))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconcile(mappings: &[FieldMapping], ocr: &OcrExtractionResult) -> Vec<FieldMapping> {
        let normalizer = Normalizer::default();
        OcrReconciler::new(&normalizer, &MatchPolicy::default()).reconcile(mappings, ocr)
    }

    #[test]
    fn no_labels_means_not_checked() {
        let mappings = [FieldMapping::exact("patient_name", "Patient Name")];
        let out = reconcile(&mappings, &OcrExtractionResult::default());
        assert_eq!(out[0].ocr, OcrVerdict::NotChecked);
        assert!(!out[0].divergence_flag());
    }

    #[test]
    fn close_label_verifies() {
        let mappings = [FieldMapping::exact("patient_name", "Patient Name")];
        let ocr = OcrExtractionResult::new(vec![
            OcrLabel::new("Patient Full Name", 0.9),
            OcrLabel::new("Signature Date", 0.99),
        ]);
        let out = reconcile(&mappings, &ocr);
        match &out[0].ocr {
            OcrVerdict::Verified { label, similarity } => {
                assert_eq!(label, "Patient Full Name");
                assert!(*similarity > 0.8);
            }
            other => panic!("expected verified, got {other:?}"),
        }
    }

    #[test]
    fn distant_label_diverges_by_position() {
        let anchor = Region::new(0, 50.0, 100.0, 200.0, 20.0);
        let mappings = [FieldMapping::exact("patient_name", "Patient Name")];
        let ocr = OcrExtractionResult::new(vec![
            OcrLabel::new("Patient Name", 1.0).at(Region::new(0, 400.0, 600.0, 100.0, 12.0)),
        ])
        .with_anchor("Patient Name", anchor);
        let out = reconcile(&mappings, &ocr);
        assert_eq!(
            out[0].ocr,
            OcrVerdict::Diverged {
                nearest_label: Some("Patient Name".to_string()),
                similarity: 1.0,
                cause: DivergenceCause::NoLabelNearPosition,
            }
        );
    }

    #[test]
    fn weak_labels_are_ignored() {
        let normalizer = Normalizer::default();
        let policy = MatchPolicy {
            ocr_min_label_confidence: 0.5,
            ..MatchPolicy::default()
        };
        let mappings = [FieldMapping::exact("patient_name", "Patient Name")];
        let ocr = OcrExtractionResult::new(vec![OcrLabel::new("Signature Date", 0.2)]);
        let out = OcrReconciler::new(&normalizer, &policy).reconcile(&mappings, &ocr);
        assert_eq!(out[0].ocr, OcrVerdict::NotChecked);
    }

    #[test]
    fn ties_prefer_confident_label() {
        let mappings = [FieldMapping::exact("dob", "DOB")];
        let ocr = OcrExtractionResult::new(vec![
            OcrLabel::new("D.O.B", 0.4),
            OcrLabel::new("DOB", 0.9),
        ]);
        let out = reconcile(&mappings, &ocr);
        assert_eq!(
            out[0].ocr,
            OcrVerdict::Verified {
                label: "DOB".to_string(),
                similarity: 1.0
            }
        );
    }
}
