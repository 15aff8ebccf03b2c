//! Cross-form row assembly.
//!
//! One run walks `INIT -> FETCH_PAGE -> (EMIT_ROWS -> FETCH_PAGE)* -> DONE`:
//!
//! - **INIT** collects the participating forms, builds the header from the
//!   column names and asks the host for the total entry count. That count,
//!   not an empty page, ends pagination.
//! - **FETCH_PAGE** requests the next fixed-size page, newest entries first.
//! - **EMIT_ROWS** produces one row per entry. Each column is looked up for
//!   the entry's form; a column with no source on that form stays empty, so
//!   every column is only populated where its owning form participates.
//! - **DONE** returns the complete matrix for serialization.
//!
//! A form the host cannot load turns that form's cells into empty strings and
//! is recorded in [`RunStats::unavailable_forms`]; the run always completes.

use std::collections::HashMap;
use std::time::Instant;

use mfx_map::ColumnResolver;
use mfx_model::{Entry, ExportDefinition, Form, FormId, OutputMatrix};
use tracing::{debug, info, warn};

use crate::filter::EntryFilter;
use crate::format::ValueFormatter;
use crate::host::{EntryStore, ExportHooks, Paging, Sorting};

/// Default number of entries requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Counters collected during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Entry count reported by the host before paging.
    pub total: usize,
    /// Pages requested.
    pub pages: usize,
    /// Data rows emitted (header excluded).
    pub rows: usize,
    /// Forms that could not be loaded, in first-seen order.
    pub unavailable_forms: Vec<FormId>,
    /// Whether the document had to be re-encoded to UTF-8.
    pub reencoded: bool,
}

pub struct RowAssembler<'a> {
    store: &'a dyn EntryStore,
    hooks: &'a dyn ExportHooks,
    formatter: &'a ValueFormatter,
    page_size: usize,
    forms: HashMap<FormId, Option<Form>>,
    stats: RunStats,
}

impl<'a> RowAssembler<'a> {
    pub fn new(
        store: &'a dyn EntryStore,
        hooks: &'a dyn ExportHooks,
        formatter: &'a ValueFormatter,
    ) -> Self {
        Self {
            store,
            hooks,
            formatter,
            page_size: DEFAULT_PAGE_SIZE,
            forms: HashMap::new(),
            stats: RunStats::default(),
        }
    }

    /// Entries per page; values below one are raised to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Build the full matrix for `definition` under `filter`.
    pub fn assemble(
        mut self,
        definition: &ExportDefinition,
        filter: &EntryFilter,
    ) -> (OutputMatrix, RunStats) {
        let started = Instant::now();
        let form_ids = ColumnResolver::participating_form_ids(definition);
        let header: Vec<String> = definition.columns().names().map(str::to_string).collect();
        let mut matrix = OutputMatrix::new(header);

        let total = if form_ids.is_empty() {
            0
        } else {
            self.store.count_entries(&form_ids, filter)
        };
        self.stats.total = total;
        debug!(form_count = form_ids.len(), total, "counted entries");

        let sorting = Sorting::default();
        let mut offset = 0;
        let mut remaining = total;
        while remaining > 0 {
            let paging = Paging {
                offset,
                page_size: self.page_size,
            };
            let entries = self
                .store
                .get_entries(&form_ids, filter, &sorting, paging);
            let entries = self.hooks.entries_before_export(entries, paging);
            self.stats.pages += 1;
            debug!(offset, fetched = entries.len(), "fetched page");

            for entry in &entries {
                let row = self.row_for(definition, entry);
                matrix.push_row(row);
            }

            offset += self.page_size;
            remaining = remaining.saturating_sub(self.page_size);
        }

        self.stats.rows = matrix.row_count();
        info!(
            rows = self.stats.rows,
            pages = self.stats.pages,
            duration_ms = started.elapsed().as_millis(),
            "assembled rows"
        );
        (matrix, self.stats)
    }

    fn row_for(&mut self, definition: &ExportDefinition, entry: &Entry) -> Vec<String> {
        let (store, hooks, formatter) = (self.store, self.hooks, self.formatter);
        let form = load_form(&mut self.forms, &mut self.stats, store, entry.form_id);
        definition
            .columns()
            .iter()
            .map(|column| match (form, column.field_for(entry.form_id)) {
                (Some(form), Some(field_id)) => {
                    formatter.format(entry, field_id, form, store, hooks)
                }
                _ => String::new(),
            })
            .collect()
    }
}

fn load_form<'f>(
    cache: &'f mut HashMap<FormId, Option<Form>>,
    stats: &mut RunStats,
    store: &dyn EntryStore,
    form_id: FormId,
) -> Option<&'f Form> {
    cache
        .entry(form_id)
        .or_insert_with(|| {
            let form = store.get_form(form_id);
            if form.is_none() {
                warn!(form_id = %form_id, "form unavailable, emitting empty cells");
                stats.unavailable_forms.push(form_id);
            }
            form
        })
        .as_ref()
}
