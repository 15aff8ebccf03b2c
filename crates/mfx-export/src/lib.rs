//! Multi-form entry export engine.
//!
//! This crate merges entries from several forms into one delimited document
//! where every output column is mapped to a different field on each form.
//!
//! # Features
//!
//! - **Row assembly**: pages through entries of all participating forms and
//!   emits one row per entry, leaving cells blank for forms a column does not
//!   map
//! - **Value formatting**: per-input-type renderers (checkbox, multi-file
//!   upload), long-value substitution, local timestamps
//! - **Serialization**: BOM-prefixed, always-quoted CSV
//! - **Host interfaces**: [`EntryStore`] and [`ExportHooks`], with an
//!   in-memory [`MemoryStore`]
//!
//! # Example
//!
//! ```ignore
//! use chrono::Utc;
//! use mfx_export::{ExportRequest, Exporter};
//!
//! let exporter = Exporter::new(&registry, &store);
//! let document = exporter.generate(&ExportRequest::new("Contacts"), Utc::now())?;
//! std::fs::write(&document.filename, &document.bytes)?;
//! ```

#![deny(unsafe_code)]

mod assemble;
mod document;
mod error;
mod filter;
mod format;
mod host;
mod memory;
mod serialize;

// === Error Types ===
pub use error::{ExportError, Result};

// === Host Interfaces ===
pub use filter::{EntryFilter, FieldFilter, FilterOperator, HostClock};
pub use host::{DefaultHooks, EntryStore, ExportHooks, Paging, SortDirection, Sorting};
pub use memory::{LongValue, MemoryStore, StoreSnapshot};

// === Row Assembly ===
pub use assemble::{DEFAULT_PAGE_SIZE, RowAssembler, RunStats};

// === Value Formatting ===
pub use format::{
    CellContext, DATE_CREATED_FORMAT, FILE_LIST_SEPARATOR, FormatFn, FormatterTable,
    LongValuePolicy, ValueFormatter, render_checkbox, render_file_upload,
};

// === Serialization ===
pub use serialize::{
    ARRAY_ELEMENT_SEPARATOR, TableSerializer, UTF8_BOM, ensure_utf8, prepare_cell,
    unserialize_list,
};

// === Documents ===
pub use document::{ExportDocument, ExportOptions, ExportRequest, Exporter, slugify};
