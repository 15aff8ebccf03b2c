//! Interfaces to the host storage system.
//!
//! The export engine never owns forms or entries. It reads them through
//! [`EntryStore`] and lets the host adjust the run through [`ExportHooks`].
//! Every call is blocking and completes before the run moves on.

use mfx_map::FormSource;
use mfx_model::{Entry, FieldId, Form, FormId};

use crate::filter::EntryFilter;

/// Sort direction for entry retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Sort order for entry retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorting {
    /// Entry key to sort on; `date_created` sorts by creation time.
    pub key: String,
    pub direction: SortDirection,
}

impl Default for Sorting {
    /// Newest entries first.
    fn default() -> Self {
        Self {
            key: FieldId::DATE_CREATED.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// One page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub offset: usize,
    pub page_size: usize,
}

/// Entry access provided by the host.
pub trait EntryStore: FormSource {
    /// Number of entries across `form_ids` matching `filter`.
    fn count_entries(&self, form_ids: &[FormId], filter: &EntryFilter) -> usize;

    /// One page of entries across `form_ids` matching `filter`.
    fn get_entries(
        &self,
        form_ids: &[FormId],
        filter: &EntryFilter,
        sorting: &Sorting,
        paging: Paging,
    ) -> Vec<Entry>;

    /// Full value of a field whose inline copy was truncated.
    fn get_long_field_value(&self, entry: &Entry, field_id: &FieldId, form: &Form)
    -> Option<String>;
}

/// Extension points invoked during a run. Every default is the identity.
pub trait ExportHooks {
    /// Rewrite a fetched page before its rows are emitted.
    fn entries_before_export(&self, entries: Vec<Entry>, _paging: Paging) -> Vec<Entry> {
        entries
    }

    /// Rewrite a formatted cell value.
    fn field_value(
        &self,
        value: String,
        _form_id: FormId,
        _field_id: &FieldId,
        _entry: &Entry,
    ) -> String {
        value
    }

    /// Cell separator, keyed by the first participating form.
    fn separator(&self, _form_id: Option<FormId>) -> u8 {
        b','
    }
}

/// Hooks that change nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl ExportHooks for DefaultHooks {}
