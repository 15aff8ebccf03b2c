//! Per-cell value formatting.
//!
//! A cell is produced from an `(entry, field id, form)` triple:
//!
//! 1. `date_created` renders the entry timestamp in host local time.
//! 2. Otherwise the raw stored value is read, replaced by the long-value store
//!    copy when the inline value reached the storage limit.
//! 3. The field's input type selects a renderer from a [`FormatterTable`];
//!    types without a renderer pass the value through.
//! 4. The result goes through [`ExportHooks::field_value`].

use std::collections::HashMap;

use mfx_model::{Entry, Field, FieldId, Form, InputType, base_id_of};
use serde_json::Value;

use crate::filter::HostClock;
use crate::host::{EntryStore, ExportHooks};

/// Output format of the `date_created` pseudo-field.
pub const DATE_CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between file names of a multi-file upload.
pub const FILE_LIST_SEPARATOR: &str = " , ";

/// When an inline value is considered truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongValuePolicy {
    /// Maximum inline length the host stores.
    pub max_field_length: usize,
    /// Values this close to the limit are looked up in the long-value store.
    pub safety_margin: usize,
}

impl Default for LongValuePolicy {
    fn default() -> Self {
        Self {
            max_field_length: 200,
            safety_margin: 10,
        }
    }
}

impl LongValuePolicy {
    pub fn threshold(&self) -> usize {
        self.max_field_length.saturating_sub(self.safety_margin)
    }

    pub fn is_long(&self, value: &str) -> bool {
        value.len() >= self.threshold()
    }
}

/// Inputs available to a renderer.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub entry: &'a Entry,
    pub form: &'a Form,
    pub field: &'a Field,
    pub field_id: &'a FieldId,
    /// Stored value after long-value substitution.
    pub value: &'a str,
}

/// Renders one cell for a given input type.
pub type FormatFn = fn(&CellContext<'_>) -> String;

/// Renderers keyed by input type.
#[derive(Debug, Clone)]
pub struct FormatterTable {
    renderers: HashMap<InputType, FormatFn>,
}

impl Default for FormatterTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(InputType::Checkbox, render_checkbox);
        table.register(InputType::FileUpload, render_file_upload);
        table
    }
}

impl FormatterTable {
    /// A table with no renderers; every value passes through.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Install or replace the renderer for `input_type`.
    pub fn register(&mut self, input_type: InputType, render: FormatFn) {
        self.renderers.insert(input_type, render);
    }

    pub fn get(&self, input_type: &InputType) -> Option<FormatFn> {
        self.renderers.get(input_type).copied()
    }

    pub fn render(&self, ctx: &CellContext<'_>) -> String {
        match self.get(&ctx.field.input_type) {
            Some(render) => render(ctx),
            None => ctx.value.to_string(),
        }
    }
}

/// Formats cell values for one export run.
#[derive(Debug, Clone, Default)]
pub struct ValueFormatter {
    table: FormatterTable,
    long_values: LongValuePolicy,
    clock: HostClock,
}

impl ValueFormatter {
    pub fn new(table: FormatterTable, long_values: LongValuePolicy, clock: HostClock) -> Self {
        Self {
            table,
            long_values,
            clock,
        }
    }

    pub fn table_mut(&mut self) -> &mut FormatterTable {
        &mut self.table
    }

    pub fn format(
        &self,
        entry: &Entry,
        field_id: &FieldId,
        form: &Form,
        store: &dyn EntryStore,
        hooks: &dyn ExportHooks,
    ) -> String {
        if field_id.is_date_created() {
            return self
                .clock
                .to_local(entry.date_created)
                .format(DATE_CREATED_FORMAT)
                .to_string();
        }

        let inline = entry.value(field_id.as_str());
        let long = if self.long_values.is_long(inline) {
            store
                .get_long_field_value(entry, field_id, form)
                .filter(|value| !value.is_empty())
        } else {
            None
        };
        let value = long.as_deref().unwrap_or(inline);

        let rendered = match form.field(field_id) {
            Some(field) => self.table.render(&CellContext {
                entry,
                form,
                field,
                field_id,
                value,
            }),
            None => value.to_string(),
        };
        hooks.field_value(rendered, form.id, field_id, entry)
    }
}

/// Checkbox cell: the stored option when the option is checked, else `""`.
///
/// An option is checked when any stored sub-input of the field holds the
/// option's label, or, with choice values enabled, when the stored value of
/// the requested id equals one of the field's choice values.
pub fn render_checkbox(ctx: &CellContext<'_>) -> String {
    let Some(base) = ctx.field_id.base_id() else {
        return String::new();
    };
    let label = ctx.field.input_label(ctx.field_id);
    let requested = ctx.entry.value(ctx.field_id.as_str());

    for (key, stored) in &ctx.entry.values {
        if base_id_of(key) != Some(base) {
            continue;
        }
        if stored == label {
            return stored.clone();
        }
        if ctx.field.enable_choice_value
            && !requested.is_empty()
            && let Some(choice) = ctx.field.choices.iter().find(|c| c.value == requested)
        {
            return choice.value.clone();
        }
    }
    String::new()
}

/// File upload cell: multi-file JSON arrays joined with `" , "`.
pub fn render_file_upload(ctx: &CellContext<'_>) -> String {
    if !ctx.field.multiple_files {
        return ctx.value.to_string();
    }
    if ctx.value.is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Vec<Value>>(ctx.value) {
        Ok(files) => files
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(FILE_LIST_SEPARATOR),
        Err(_) => String::new(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}
