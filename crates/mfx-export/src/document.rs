//! Document generation entry point.
//!
//! [`Exporter`] ties a run together: it looks up the export by name, builds
//! the entry filter from the requested local date range, assembles the
//! matrix, serializes it and names the resulting file.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, info_span};

use mfx_map::{ColumnResolver, ExportRegistry};

use crate::assemble::{DEFAULT_PAGE_SIZE, RowAssembler, RunStats};
use crate::error::{ExportError, Result};
use crate::filter::{FieldFilter, HostClock};
use crate::format::{FormatterTable, LongValuePolicy, ValueFormatter};
use crate::host::{DefaultHooks, EntryStore, ExportHooks};
use crate::serialize::TableSerializer;

/// Caller-selected export and filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRequest {
    pub export_name: String,
    /// Inclusive first local calendar day.
    pub start_date: Option<NaiveDate>,
    /// Inclusive last local calendar day.
    pub end_date: Option<NaiveDate>,
    pub field_filters: Vec<FieldFilter>,
}

impl ExportRequest {
    pub fn new(export_name: impl Into<String>) -> Self {
        Self {
            export_name: export_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }
}

/// Run-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub page_size: usize,
    /// Charset advertised in the content type.
    pub charset: String,
    pub long_values: LongValuePolicy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            charset: "UTF-8".to_string(),
            long_values: LongValuePolicy::default(),
        }
    }
}

/// A serialized export ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    /// Suggested file name: `<slug>-<YYYY-MM-DD>.csv`.
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub stats: RunStats,
}

pub struct Exporter<'a> {
    registry: &'a ExportRegistry,
    store: &'a dyn EntryStore,
    hooks: &'a dyn ExportHooks,
    clock: HostClock,
    options: ExportOptions,
    table: FormatterTable,
}

impl<'a> Exporter<'a> {
    pub fn new(registry: &'a ExportRegistry, store: &'a dyn EntryStore) -> Self {
        Self {
            registry,
            store,
            hooks: &DefaultHooks,
            clock: HostClock::default(),
            options: ExportOptions::default(),
            table: FormatterTable::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: &'a dyn ExportHooks) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: HostClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_formatters(mut self, table: FormatterTable) -> Self {
        self.table = table;
        self
    }

    /// Generate the document for `request`.
    ///
    /// # Errors
    ///
    /// [`ExportError::ExportNotFound`] when the name is not registered;
    /// serialization failures otherwise.
    pub fn generate(&self, request: &ExportRequest, run_at: DateTime<Utc>) -> Result<ExportDocument> {
        let definition = self.registry.lookup(&request.export_name).ok_or_else(|| {
            ExportError::ExportNotFound {
                name: request.export_name.clone(),
            }
        })?;
        let span = info_span!("export", export_name = %definition.name());
        let _guard = span.enter();

        let mut filter = self.clock.date_filter(request.start_date, request.end_date);
        filter.field_filters = request.field_filters.clone();

        let formatter = ValueFormatter::new(self.table.clone(), self.options.long_values, self.clock);
        let (matrix, mut stats) = RowAssembler::new(self.store, self.hooks, &formatter)
            .with_page_size(self.options.page_size)
            .assemble(definition, &filter);

        let first_form = ColumnResolver::participating_form_ids(definition)
            .first()
            .copied();
        let serializer = TableSerializer::new(self.hooks.separator(first_form));
        let (bytes, reencoded) = serializer.serialize_document(&matrix)?;
        stats.reencoded = reencoded;

        let local_day = self.clock.to_local(run_at.naive_utc()).date();
        let filename = format!(
            "{}-{}.csv",
            slugify(definition.name()),
            local_day.format("%Y-%m-%d")
        );
        info!(filename = %filename, rows = stats.rows, bytes = bytes.len(), "export generated");

        Ok(ExportDocument {
            filename,
            content_type: format!("text/plain; charset={}", self.options.charset),
            bytes,
            stats,
        })
    }
}

/// Lower-case, dash-separated ASCII form of `name` suitable for file names.
///
/// Common Latin accents are folded to their base letter; other non-ASCII
/// characters separate words.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch);
        } else if let Some(folded) = fold_accent(ch) {
            slug.push_str(folded);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn fold_accent(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        'ð' => "d",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Gravity Forms Multi Export"), "gravity-forms-multi-export");
        assert_eq!(slugify("  Sales -- Q1 / 2024! "), "sales-q1-2024");
        assert_eq!(slugify("snake_case name"), "snake_case-name");
    }

    #[test]
    fn slugify_folds_accents_to_ascii() {
        assert_eq!(slugify("Café Export"), "cafe-export");
        assert_eq!(slugify("Größe Übersicht"), "grosse-ubersicht");
        assert_eq!(slugify("Prix € 2024"), "prix-2024");
        assert_eq!(slugify("日本 list"), "list");
    }
}
