//! In-memory host storage.
//!
//! Holds forms, entries and long values loaded up front (typically from a JSON
//! snapshot) and answers [`EntryStore`] queries with the same filtering,
//! sorting and paging semantics the export engine expects from a real host.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mfx_map::FormSource;
use mfx_model::{Entry, FieldId, Form, FormId};

use crate::filter::EntryFilter;
use crate::host::{EntryStore, Paging, SortDirection, Sorting};

/// Full value of a field stored outside the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongValue {
    pub entry_id: u64,
    pub field_id: FieldId,
    pub value: String,
}

/// Serialized shape of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub long_values: Vec<LongValue>,
}

/// Host storage backed by in-process collections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "StoreSnapshot")]
pub struct MemoryStore {
    forms: BTreeMap<FormId, Form>,
    entries: Vec<Entry>,
    long_values: BTreeMap<(u64, FieldId), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_form(&mut self, form: Form) {
        self.forms.insert(form.id, form);
    }

    pub fn insert_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn insert_long_value(&mut self, entry_id: u64, field_id: FieldId, value: impl Into<String>) {
        self.long_values.insert((entry_id, field_id), value.into());
    }

    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn matching<'a>(
        &'a self,
        form_ids: &'a [FormId],
        filter: &'a EntryFilter,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| form_ids.contains(&entry.form_id) && filter.matches(entry))
    }
}

impl From<StoreSnapshot> for MemoryStore {
    fn from(snapshot: StoreSnapshot) -> Self {
        let mut store = Self::new();
        for form in snapshot.forms {
            store.insert_form(form);
        }
        store.entries = snapshot.entries;
        for long in snapshot.long_values {
            store.insert_long_value(long.entry_id, long.field_id, long.value);
        }
        store
    }
}

impl FormSource for MemoryStore {
    fn get_form(&self, form_id: FormId) -> Option<Form> {
        self.forms.get(&form_id).cloned()
    }
}

impl EntryStore for MemoryStore {
    fn count_entries(&self, form_ids: &[FormId], filter: &EntryFilter) -> usize {
        self.matching(form_ids, filter).count()
    }

    fn get_entries(
        &self,
        form_ids: &[FormId],
        filter: &EntryFilter,
        sorting: &Sorting,
        paging: Paging,
    ) -> Vec<Entry> {
        let mut found: Vec<&Entry> = self.matching(form_ids, filter).collect();
        found.sort_by(|a, b| {
            let ordering = compare_entries(a, b, &sorting.key);
            match sorting.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        found
            .into_iter()
            .skip(paging.offset)
            .take(paging.page_size)
            .cloned()
            .collect()
    }

    fn get_long_field_value(
        &self,
        entry: &Entry,
        field_id: &FieldId,
        _form: &Form,
    ) -> Option<String> {
        self.long_values.get(&(entry.id, field_id.clone())).cloned()
    }
}

fn compare_entries(a: &Entry, b: &Entry, key: &str) -> Ordering {
    let primary = if key == FieldId::DATE_CREATED {
        a.date_created.cmp(&b.date_created)
    } else {
        a.value(key).cmp(b.value(key))
    };
    primary.then_with(|| a.id.cmp(&b.id))
}
