//! Export definitions and their column maps.
//!
//! An export maps named output columns to `(form, field)` sources. The same
//! logical column may be backed by a different field on each form, so every
//! column carries an ordered list of sources, at most one per form.
//!
//! Definitions come from an [`ExportSpec`]: either an explicit column map or a
//! list of form ids whose fields are scanned to derive the columns. The
//! derivation itself lives in `mfx-map`; it runs once when the definition is
//! built and the resulting [`ExportDefinition`] is read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{FieldId, FormId};

/// One `(form, field)` source backing a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(FormId, FieldId)", into = "(FormId, FieldId)")]
pub struct ColumnSource {
    pub form_id: FormId,
    pub field_id: FieldId,
}

impl ColumnSource {
    pub fn new(form_id: FormId, field_id: FieldId) -> Self {
        Self { form_id, field_id }
    }
}

impl From<(FormId, FieldId)> for ColumnSource {
    fn from((form_id, field_id): (FormId, FieldId)) -> Self {
        Self { form_id, field_id }
    }
}

impl From<ColumnSource> for (FormId, FieldId) {
    fn from(value: ColumnSource) -> Self {
        (value.form_id, value.field_id)
    }
}

/// A named output column and its sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<ColumnSource>,
}

impl Column {
    /// Field backing this column on `form_id`. First match wins.
    pub fn field_for(&self, form_id: FormId) -> Option<&FieldId> {
        self.sources
            .iter()
            .find(|source| source.form_id == form_id)
            .map(|source| &source.field_id)
    }
}

/// Ordered column-name to sources mapping. Column names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct ColumnMap {
    columns: Vec<Column>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new column. Fails if the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, sources: Vec<ColumnSource>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyName { kind: "column" });
        }
        if self.get(&name).is_some() {
            return Err(ModelError::DuplicateColumn { name });
        }
        self.columns.push(Column { name, sources });
        Ok(())
    }

    /// Builder form of [`ColumnMap::insert`].
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        sources: impl IntoIterator<Item = (FormId, FieldId)>,
    ) -> Result<Self> {
        let sources = sources.into_iter().map(ColumnSource::from).collect();
        self.insert(name, sources)?;
        Ok(self)
    }

    /// Append a source to `name`, creating the column on first sight.
    pub fn append_source(&mut self, name: &str, source: ColumnSource) {
        match self.columns.iter_mut().find(|column| column.name == name) {
            Some(column) => column.sources.push(source),
            None => self.columns.push(Column {
                name: name.to_string(),
                sources: vec![source],
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl TryFrom<Vec<Column>> for ColumnMap {
    type Error = ModelError;

    fn try_from(value: Vec<Column>) -> Result<Self> {
        let mut map = Self::new();
        for column in value {
            map.insert(column.name, column.sources)?;
        }
        Ok(map)
    }
}

impl From<ColumnMap> for Vec<Column> {
    fn from(value: ColumnMap) -> Self {
        value.columns
    }
}

impl<'a> IntoIterator for &'a ColumnMap {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Unresolved export as written in configuration.
///
/// A non-empty `columns` map is used as-is; otherwise columns are derived
/// from the fields of `form_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "ColumnMap::is_empty")]
    pub columns: ColumnMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_ids: Vec<FormId>,
}

impl ExportSpec {
    /// Export with an explicit column map.
    pub fn explicit(name: impl Into<String>, columns: ColumnMap) -> Self {
        Self {
            name: name.into(),
            columns,
            form_ids: Vec::new(),
        }
    }

    /// Export whose columns are derived from the given forms.
    pub fn auto(name: impl Into<String>, form_ids: impl IntoIterator<Item = FormId>) -> Self {
        Self {
            name: name.into(),
            columns: ColumnMap::new(),
            form_ids: form_ids.into_iter().collect(),
        }
    }
}

/// A resolved, named export definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDefinition {
    name: String,
    columns: ColumnMap,
    form_ids: Vec<FormId>,
}

impl ExportDefinition {
    pub fn new(name: impl Into<String>, columns: ColumnMap, form_ids: Vec<FormId>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyName { kind: "export" });
        }
        Ok(Self {
            name,
            columns,
            form_ids,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Form ids the columns were derived from (empty for explicit maps).
    pub fn form_ids(&self) -> &[FormId] {
        &self.form_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fid(raw: &str) -> FieldId {
        FieldId::new(raw).unwrap()
    }

    #[test]
    fn insert_rejects_duplicate_column_names() {
        let mut map = ColumnMap::new();
        map.insert("Name", vec![]).unwrap();
        let err = map.insert("Name", vec![]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateColumn {
                name: "Name".to_string()
            }
        );
    }

    #[test]
    fn append_source_keeps_first_seen_order() {
        let mut map = ColumnMap::new();
        map.append_source("Email", ColumnSource::new(FormId::new(1), fid("2")));
        map.append_source("Name", ColumnSource::new(FormId::new(1), fid("1")));
        map.append_source("Email", ColumnSource::new(FormId::new(2), fid("4")));
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["Email", "Name"]);
        assert_eq!(map.get("Email").unwrap().sources.len(), 2);
    }

    #[test]
    fn field_for_returns_first_match() {
        let column = Column {
            name: "Name".to_string(),
            sources: vec![
                ColumnSource::new(FormId::new(1), fid("1")),
                ColumnSource::new(FormId::new(2), fid("5")),
                ColumnSource::new(FormId::new(2), fid("6")),
            ],
        };
        assert_eq!(column.field_for(FormId::new(2)), Some(&fid("5")));
        assert_eq!(column.field_for(FormId::new(3)), None);
    }

    #[test]
    fn definition_requires_name() {
        let err = ExportDefinition::new("  ", ColumnMap::new(), vec![]).unwrap_err();
        assert_eq!(err, ModelError::EmptyName { kind: "export" });
    }
}
