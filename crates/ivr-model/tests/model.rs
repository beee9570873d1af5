//! Tests for ivr-model types.

use ivr_model::{
    CorrectionReason, CorrectionRecord, FieldMapping, FieldType, MappingReport, MatchMethod,
    OcrExtractionResult, OcrLabel, OcrVerdict, Region, RemovalReason, RemovalRecord, SourceField,
    SourceValue, TargetFieldCatalog, ValueType,
};

#[test]
fn report_serializes() {
    let catalog = TargetFieldCatalog::from_names(["Practice Name", "Patient Name"]);
    let report = MappingReport::new(
        &catalog,
        Some("MedLife"),
        vec![
            FieldMapping::exact("patient_name", "Patient Name"),
            FieldMapping::fuzzy("facility_name", "Practice Name", 0.92),
        ],
        vec![CorrectionRecord {
            source_key: "facility_name".to_string(),
            original_target_name: "Practice Nmae".to_string(),
            corrected_target_name: "Practice Name".to_string(),
            method: MatchMethod::Fuzzy,
            confidence: 0.92,
            reason: CorrectionReason::FuzzyMatch,
        }],
        vec![RemovalRecord {
            source_key: "xyz_field".to_string(),
            invalid_target_name: "Totally Unrelated Field".to_string(),
            reason: RemovalReason::NoEligibleCandidate,
            best_candidate: None,
            best_confidence: None,
        }],
    );
    let json = serde_json::to_string(&report).expect("serialize report");
    assert!(json.contains("\"method\":\"fuzzy\""));
    assert!(json.contains("\"reason\":\"no_eligible_candidate\""));
    assert!(json.contains("\"status\":\"not_checked\""));
    let round: MappingReport = serde_json::from_str(&json).expect("deserialize report");
    assert_eq!(round, report);
}

#[test]
fn catalog_accepts_service_field_shape() {
    let json = r#"{
        "template_id": "ivr-medlife-v3",
        "fields": [
            {"name": "Physician NPI", "type": "text", "required": true},
            {"name": "Signature", "type": "signature"},
            {"name": "Wound Photo", "type": "stamp"}
        ]
    }"#;
    let catalog: TargetFieldCatalog = serde_json::from_str(json).expect("parse catalog");
    assert_eq!(catalog.len(), 3);
    assert!(catalog.fields[0].required);
    assert_eq!(catalog.fields[1].declared_type, FieldType::Signature);
    assert!(!catalog.fields[1].required);
    assert_eq!(catalog.fields[2].declared_type, FieldType::Unknown);
}

#[test]
fn source_values_deserialize_untagged() {
    let json = r#"[
        {"key": "patient_name", "value": "John Doe"},
        {"key": "wound_count", "value": 3},
        {"key": "is_diabetic", "value": false},
        {"key": "icd10_codes", "value": ["E11.621", "L97.529"]}
    ]"#;
    let fields: Vec<SourceField> = serde_json::from_str(json).expect("parse sources");
    let types: Vec<ValueType> = fields.iter().map(SourceField::value_type).collect();
    assert_eq!(
        types,
        vec![
            ValueType::String,
            ValueType::Number,
            ValueType::Bool,
            ValueType::List
        ]
    );
    assert_eq!(fields[1].value, SourceValue::Number(3.0));
}

#[test]
fn ocr_result_defaults() {
    let json = r#"{
        "labels": [
            {"raw_text": "Patient Full Name", "region": {"page": 0, "x": 40.0, "y": 95.0, "width": 120.0, "height": 12.0}}
        ],
        "anchors": {"Patient Name": {"page": 0, "x": 50.0, "y": 100.0, "width": 200.0, "height": 20.0}}
    }"#;
    let ocr: OcrExtractionResult = serde_json::from_str(json).expect("parse ocr");
    assert_eq!(ocr.labels[0].bounding_confidence, 1.0);
    assert_eq!(ocr.labels[0].comparable_text(), "Patient Full Name");
    assert!(ocr.has_positions(0.0));
    assert!(!ocr.has_positions(1.5));
    assert_eq!(
        ocr.anchors.get("Patient Name"),
        Some(&Region::new(0, 50.0, 100.0, 200.0, 20.0))
    );
    let built = OcrExtractionResult::new(vec![OcrLabel::new("Patient Full Name", 0.9)]);
    assert!(!built.has_positions(0.0));
}

#[test]
fn stored_mapping_without_ocr_defaults_to_not_checked() {
    let json = r#"{"source_key": "facility_name", "target_name": "Practice Nmae",
                   "method": "exact", "confidence": 1.0, "accepted": true}"#;
    let mapping: FieldMapping = serde_json::from_str(json).expect("parse mapping");
    assert_eq!(mapping.ocr, OcrVerdict::NotChecked);
    assert!(mapping.is_consistent());
}
