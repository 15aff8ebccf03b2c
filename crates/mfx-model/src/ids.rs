#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Identifier of a form in the host storage system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct FormId(u32);

impl FormId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for FormId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a field (or sub-input, or pseudo-field) on an entry.
///
/// Sub-inputs use dotted ids such as `3.1`; pseudo-fields such as
/// `date_created` carry entry metadata rather than submitted values.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct FieldId(String);

impl FieldId {
    /// Pseudo-field holding the entry creation timestamp.
    pub const DATE_CREATED: &'static str = "date_created";

    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidFieldId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn date_created() -> Self {
        Self(Self::DATE_CREATED.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_date_created(&self) -> bool {
        self.0 == Self::DATE_CREATED
    }

    /// Integer part of the id (`3` for both `3` and `3.1`).
    ///
    /// Returns `None` for pseudo-fields.
    pub fn base_id(&self) -> Option<u32> {
        base_id_of(&self.0)
    }
}

/// Integer part of a raw field or input key.
pub fn base_id_of(raw: &str) -> Option<u32> {
    let head = raw.split('.').next().unwrap_or(raw);
    head.trim().parse().ok()
}

impl TryFrom<String> for FieldId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FieldId {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldId> for String {
    fn from(value: FieldId) -> Self {
        value.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_trims_and_rejects_blank() {
        assert_eq!(FieldId::new(" 5 ").unwrap().as_str(), "5");
        assert!(FieldId::new("   ").is_err());
    }

    #[test]
    fn base_id_handles_sub_inputs_and_pseudo_fields() {
        assert_eq!(FieldId::new("3").unwrap().base_id(), Some(3));
        assert_eq!(FieldId::new("3.12").unwrap().base_id(), Some(3));
        assert_eq!(FieldId::date_created().base_id(), None);
        assert!(FieldId::date_created().is_date_created());
    }
}
