//! Target form fields as reported by the template service.

use serde::{Deserialize, Serialize};

/// Field kind declared by the template service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Checkbox,
    Radio,
    Select,
    Signature,
    Initials,
    Image,
    Cells,
    #[serde(other)]
    Unknown,
}

/// One field the destination form actually exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetField {
    /// Field name, verbatim from the template service.
    pub name: String,
    /// Declared field kind.
    #[serde(default, rename = "type")]
    pub declared_type: FieldType,
    /// Whether the form requires a value.
    #[serde(default)]
    pub required: bool,
    /// Template the field was discovered on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_template_id: Option<String>,
}

impl TargetField {
    pub fn new(name: impl Into<String>, declared_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            declared_type,
            required,
            source_template_id: None,
        }
    }

    /// A non-required text field; handy for catalogs built from bare names.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text, false)
    }
}

/// The authoritative set of fields one form version exposes.
///
/// Names are compared verbatim (case-sensitive): the catalog mirrors the
/// external service and is never normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFieldCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub fields: Vec<TargetField>,
}

impl TargetFieldCatalog {
    /// Builds a catalog, stamping each field with the template id when the
    /// field does not carry its own.
    pub fn new(template_id: Option<String>, fields: Vec<TargetField>) -> Self {
        let fields = fields
            .into_iter()
            .map(|mut field| {
                if field.source_template_id.is_none() {
                    field.source_template_id.clone_from(&template_id);
                }
                field
            })
            .collect();
        Self {
            template_id,
            fields,
        }
    }

    /// Builds a catalog of non-required text fields.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(None, names.into_iter().map(TargetField::text).collect())
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&TargetField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Names of fields the form requires, in catalog order.
    pub fn required_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_case_sensitive() {
        let catalog = TargetFieldCatalog::from_names(["Patient Name"]);
        assert!(catalog.contains("Patient Name"));
        assert!(!catalog.contains("patient name"));
    }

    #[test]
    fn template_id_is_stamped_on_fields() {
        let catalog = TargetFieldCatalog::new(
            Some("tpl-7".to_string()),
            vec![
                TargetField::new("Physician NPI", FieldType::Text, true),
                TargetField {
                    source_template_id: Some("tpl-other".to_string()),
                    ..TargetField::text("Patient DOB")
                },
            ],
        );
        assert_eq!(catalog.fields[0].source_template_id.as_deref(), Some("tpl-7"));
        assert_eq!(
            catalog.fields[1].source_template_id.as_deref(),
            Some("tpl-other")
        );
        assert_eq!(catalog.required_names(), vec!["Physician NPI".to_string()]);
    }
}
