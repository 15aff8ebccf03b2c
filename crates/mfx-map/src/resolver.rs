//! Column resolution.
//!
//! Turns an [`ExportSpec`] into an [`ExportDefinition`] and answers the two
//! questions the row assembler asks per run: which field backs a column on a
//! given form, and which forms participate at all.
//!
//! # Auto-derived columns
//!
//! When a spec has no explicit columns, each form in `form_ids` is loaded and
//! its fields are scanned in declared order. A field's column name is its
//! admin label, or its label when the admin label is empty. Name collisions
//! are deduplicated per form only: a second "Email" field on the same form is
//! skipped, while an "Email" field on another form appends a second source to
//! the shared "Email" column.

use std::collections::HashSet;

use mfx_model::{ColumnMap, ColumnSource, ExportDefinition, ExportSpec, FieldId, Form, FormId};
use tracing::{debug, warn};

use crate::error::Result;

/// Read access to form descriptors in the host storage system.
pub trait FormSource {
    /// Load a form, or `None` when the host cannot provide it.
    fn get_form(&self, form_id: FormId) -> Option<Form>;
}

impl<T: FormSource + ?Sized> FormSource for &T {
    fn get_form(&self, form_id: FormId) -> Option<Form> {
        (**self).get_form(form_id)
    }
}

/// Stateless resolver for export column maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnResolver;

impl ColumnResolver {
    /// Resolve a spec into a definition.
    ///
    /// Explicit columns are taken as-is; otherwise they are derived from the
    /// spec's forms. Forms the host cannot load are skipped.
    pub fn resolve(spec: &ExportSpec, forms: &dyn FormSource) -> Result<ExportDefinition> {
        let columns = if spec.columns.is_empty() {
            Self::auto_columns(&spec.form_ids, forms)
        } else {
            spec.columns.clone()
        };
        let definition = ExportDefinition::new(spec.name.clone(), columns, spec.form_ids.clone())?;
        debug!(
            export_name = %definition.name(),
            column_count = definition.columns().len(),
            "resolved export columns"
        );
        Ok(definition)
    }

    /// Derive columns from the fields of `form_ids`, in the given order.
    pub fn auto_columns(form_ids: &[FormId], forms: &dyn FormSource) -> ColumnMap {
        let mut columns = ColumnMap::new();
        for &form_id in form_ids {
            let Some(form) = forms.get_form(form_id) else {
                warn!(form_id = %form_id, "form unavailable, skipping for column derivation");
                continue;
            };
            let mut seen_on_form: HashSet<&str> = HashSet::new();
            for field in &form.fields {
                let name = field.column_name();
                if !seen_on_form.insert(name) {
                    continue;
                }
                columns.append_source(name, ColumnSource::new(form_id, field.id.clone()));
            }
        }
        columns
    }

    /// Field backing `column_name` for entries of `form_id`.
    ///
    /// `None` means the cell is empty for that form.
    pub fn field_for<'a>(
        definition: &'a ExportDefinition,
        column_name: &str,
        form_id: FormId,
    ) -> Option<&'a FieldId> {
        definition.columns().get(column_name)?.field_for(form_id)
    }

    /// Every form referenced by a column, deduplicated in first-seen order.
    pub fn participating_form_ids(definition: &ExportDefinition) -> Vec<FormId> {
        let mut seen = HashSet::new();
        definition
            .columns()
            .iter()
            .flat_map(|column| column.sources.iter())
            .map(|source| source.form_id)
            .filter(|form_id| seen.insert(*form_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mfx_model::{Field, InputType};

    use super::*;

    struct Forms(BTreeMap<FormId, Form>);

    impl FormSource for Forms {
        fn get_form(&self, form_id: FormId) -> Option<Form> {
            self.0.get(&form_id).cloned()
        }
    }

    fn field(id: &str, label: &str) -> Field {
        Field::new(FieldId::new(id).unwrap(), label, InputType::Text)
    }

    fn forms(list: Vec<Form>) -> Forms {
        Forms(list.into_iter().map(|form| (form.id, form)).collect())
    }

    #[test]
    fn repeated_label_on_one_form_is_skipped() {
        let source = forms(vec![Form::new(
            FormId::new(1),
            "A",
            vec![field("1", "Email"), field("2", "Email"), field("3", "Phone")],
        )]);
        let columns = ColumnResolver::auto_columns(&[FormId::new(1)], &source);
        let email = columns.get("Email").unwrap();
        assert_eq!(email.sources.len(), 1);
        assert_eq!(email.sources[0].field_id.as_str(), "1");
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn participating_forms_are_deduplicated_in_order() {
        let columns = ColumnMap::new()
            .with_column(
                "Name",
                [
                    (FormId::new(2), FieldId::new("1").unwrap()),
                    (FormId::new(1), FieldId::new("1").unwrap()),
                ],
            )
            .unwrap()
            .with_column("Email", [(FormId::new(2), FieldId::new("2").unwrap())])
            .unwrap();
        let definition = ExportDefinition::new("X", columns, vec![]).unwrap();
        assert_eq!(
            ColumnResolver::participating_form_ids(&definition),
            vec![FormId::new(2), FormId::new(1)]
        );
    }
}
