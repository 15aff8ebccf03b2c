use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, trace};

use mfx_cli::config::{ExportConfig, load_store};
use mfx_cli::logging::redact_value;
use mfx_export::{ExportDocument, ExportRequest, Exporter, MemoryStore};
use mfx_map::{ColumnResolver, ExportRegistry};

use crate::cli::{ExportArgs, SourceArgs};
use crate::types::{ExportListing, ExportOutcome};

struct Workspace {
    config: ExportConfig,
    store: MemoryStore,
    registry: ExportRegistry,
}

fn open(source: &SourceArgs) -> Result<Workspace> {
    let config = ExportConfig::load(&source.config)?;
    let store = load_store(&source.data)?;
    let registry = config.build_registry(&store)?;
    debug!(exports = registry.len(), "registry built");
    Ok(Workspace {
        config,
        store,
        registry,
    })
}

pub fn run_list(args: &SourceArgs) -> Result<Vec<ExportListing>> {
    let workspace = open(args)?;
    Ok(listings(&workspace.registry))
}

pub fn listings(registry: &ExportRegistry) -> Vec<ExportListing> {
    registry
        .iter()
        .map(|definition| ExportListing {
            name: definition.name().to_string(),
            columns: definition.columns().len(),
            forms: ColumnResolver::participating_form_ids(definition),
        })
        .collect()
}

pub fn run_export(args: &ExportArgs, run_at: DateTime<Utc>) -> Result<ExportOutcome> {
    let span = info_span!("run", export = %args.name);
    let _guard = span.enter();
    let workspace = open(&args.source)?;
    let clock = workspace.config.clock()?;

    for filter in &args.filters {
        trace!(
            key = %filter.key,
            operator = ?filter.operator,
            value = redact_value(&filter.value),
            "field filter"
        );
    }
    let request = ExportRequest {
        export_name: args.name.clone(),
        start_date: args.start,
        end_date: args.end,
        field_filters: args.filters.clone(),
    };
    let document = Exporter::new(&workspace.registry, &workspace.store)
        .with_clock(clock)
        .with_options(workspace.config.options())
        .generate(&request, run_at)?;

    let path = if args.stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&document.bytes).context("write document to stdout")?;
        stdout.flush().context("flush stdout")?;
        None
    } else {
        let dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        Some(write_document(&dir, &document)?)
    };

    Ok(ExportOutcome {
        export_name: args.name.clone(),
        filename: document.filename,
        content_type: document.content_type,
        path,
        bytes: document.bytes.len(),
        stats: document.stats,
    })
}

fn write_document(dir: &Path, document: &ExportDocument) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(&document.filename);
    fs::write(&path, &document.bytes).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "document written");
    Ok(path)
}
