use std::path::PathBuf;

use mfx_export::RunStats;
use mfx_model::FormId;

/// One registered export as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportListing {
    pub name: String,
    pub columns: usize,
    pub forms: Vec<FormId>,
}

/// Result of one `export` run.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub export_name: String,
    pub filename: String,
    pub content_type: String,
    /// Written file; `None` when the document went to stdout.
    pub path: Option<PathBuf>,
    pub bytes: usize,
    pub stats: RunStats,
}
