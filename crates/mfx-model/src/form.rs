//! Form and field descriptors as exposed by the host storage system.
//!
//! Forms are read-only snapshots fetched per export run. Only the parts the
//! export engine needs are modelled: the ordered field list, labels used for
//! column naming, and the input-type tag used to pick a value renderer.

use serde::{Deserialize, Serialize};

use crate::ids::{FieldId, FormId, base_id_of};

/// Input-type tag of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputType {
    Checkbox,
    FileUpload,
    Date,
    #[default]
    Text,
    Other(String),
}

impl InputType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Checkbox => "checkbox",
            Self::FileUpload => "fileupload",
            Self::Date => "date",
            Self::Text => "text",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for InputType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "checkbox" => Self::Checkbox,
            "fileupload" => Self::FileUpload,
            "date" => Self::Date,
            "text" => Self::Text,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for InputType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<InputType> for String {
    fn from(value: InputType) -> Self {
        value.as_str().to_string()
    }
}

/// Sub-input of a multi-input field (one per checkbox option).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInput {
    pub id: FieldId,
    pub label: String,
}

/// Selectable choice of a choice-based field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub value: String,
}

/// A field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    /// Admin-facing label; preferred for column naming when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_label: Option<String>,
    #[serde(default)]
    pub input_type: InputType,
    /// File upload accepting several files (value stored as a JSON array).
    #[serde(default)]
    pub multiple_files: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<FieldInput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub enable_choice_value: bool,
}

impl Field {
    pub fn new(id: FieldId, label: impl Into<String>, input_type: InputType) -> Self {
        Self {
            id,
            label: label.into(),
            admin_label: None,
            input_type,
            multiple_files: false,
            inputs: Vec::new(),
            choices: Vec::new(),
            enable_choice_value: false,
        }
    }

    #[must_use]
    pub fn with_admin_label(mut self, admin_label: impl Into<String>) -> Self {
        self.admin_label = Some(admin_label.into());
        self
    }

    /// Name this field contributes when columns are derived automatically.
    pub fn column_name(&self) -> &str {
        match self.admin_label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.label,
        }
    }

    /// Label of the sub-input named by `field_id`, falling back to the field label.
    pub fn input_label(&self, field_id: &FieldId) -> &str {
        self.inputs
            .iter()
            .find(|input| &input.id == field_id)
            .map_or(self.label.as_str(), |input| input.label.as_str())
    }
}

/// A form descriptor with its ordered field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Form {
    pub fn new(id: FormId, title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id,
            title: title.into(),
            fields,
        }
    }

    /// Field backing `field_id`; sub-input ids resolve to their parent field.
    pub fn field(&self, field_id: &FieldId) -> Option<&Field> {
        if let Some(field) = self.fields.iter().find(|field| &field.id == field_id) {
            return Some(field);
        }
        let base = field_id.base_id()?;
        self.fields
            .iter()
            .find(|field| base_id_of(field.id.as_str()) == Some(base))
    }
}
