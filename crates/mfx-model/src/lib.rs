//! Data model for multi-form entry exports.
//!
//! Forms and entries are snapshots owned by the host storage system; export
//! definitions and output matrices are owned by the export engine.

pub mod definition;
pub mod entry;
pub mod error;
pub mod form;
pub mod ids;
pub mod table;

pub use definition::{Column, ColumnMap, ColumnSource, ExportDefinition, ExportSpec};
pub use entry::{Entry, EntryStatus, TIMESTAMP_FORMAT};
pub use error::{ModelError, Result};
pub use form::{Choice, Field, FieldInput, Form, InputType};
pub use ids::{FieldId, FormId, base_id_of};
pub use table::OutputMatrix;
