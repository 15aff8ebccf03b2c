//! JSON configuration and host data loading.
//!
//! The registry is rebuilt from configuration on every start:
//!
//! ```json
//! {
//!   "utc_offset": "+02:00",
//!   "charset": "UTF-8",
//!   "page_size": 100,
//!   "multi_form_ids": "1, 2",
//!   "exports": [
//!     { "name": "Contacts", "columns": [{ "name": "Email", "sources": [[1, "2"]] }] },
//!     { "name": "Everything", "form_ids": [1, 2, 3] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use mfx_export::{DEFAULT_PAGE_SIZE, ExportOptions, HostClock, LongValuePolicy, MemoryStore};
use mfx_map::{
    DEFAULT_MULTI_EXPORT_NAME, ExportRegistry, FormSource, RegistryError, parse_form_id_list,
};
use mfx_model::ExportSpec;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Host local offset from UTC, such as `+02:00` or `-05:30`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Comma-separated form ids registered as one auto-derived export.
    #[serde(default)]
    pub multi_form_ids: Option<String>,
    #[serde(default)]
    pub exports: Vec<ExportSpec>,
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
            charset: default_charset(),
            page_size: default_page_size(),
            multi_form_ids: None,
            exports: Vec::new(),
        }
    }
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        if config.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(config)
    }

    pub fn clock(&self) -> Result<HostClock> {
        let offset = parse_utc_offset(&self.utc_offset)
            .with_context(|| format!("invalid utc_offset '{}'", self.utc_offset))?;
        Ok(HostClock::new(offset))
    }

    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            page_size: self.page_size,
            charset: self.charset.clone(),
            long_values: LongValuePolicy::default(),
        }
    }

    /// Every configured export, the settings-screen form list last.
    pub fn specs(&self) -> Vec<ExportSpec> {
        let mut specs = self.exports.clone();
        if let Some(raw) = &self.multi_form_ids {
            let form_ids = parse_form_id_list(raw);
            if form_ids.is_empty() {
                debug!(raw = %raw, "multi_form_ids holds no form ids");
            } else {
                specs.push(ExportSpec::auto(DEFAULT_MULTI_EXPORT_NAME, form_ids));
            }
        }
        specs
    }

    /// Resolve every export against `forms`.
    ///
    /// A repeated name keeps the first registration and is logged.
    pub fn build_registry(&self, forms: &dyn FormSource) -> Result<ExportRegistry> {
        let mut registry = ExportRegistry::new();
        for spec in self.specs() {
            match registry.register_spec(&spec, forms) {
                Ok(()) => {}
                Err(RegistryError::DuplicateName { name }) => {
                    warn!(export = %name, "duplicate export name, keeping the first definition");
                }
                Err(error) => {
                    return Err(error).with_context(|| format!("register export '{}'", spec.name));
                }
            }
        }
        Ok(registry)
    }
}

/// Load forms, entries and long values from a JSON data file.
pub fn load_store(path: &Path) -> Result<MemoryStore> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read data {}", path.display()))?;
    let store: MemoryStore = serde_json::from_str(&text)
        .with_context(|| format!("parse data {}", path.display()))?;
    debug!(
        forms = store.form_count(),
        entries = store.entry_count(),
        "loaded host data"
    );
    Ok(store)
}

/// Parse `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `+HHMM`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    raw.parse::<FixedOffset>()
        .with_context(|| format!("invalid utc_offset {raw:?}, expected +HH:MM"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_utc_offset("-0530").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset(" utc ").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("02:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(parse_utc_offset("soon").is_err());
    }

    #[test]
    fn multi_form_ids_register_default_export() {
        let config = ExportConfig {
            multi_form_ids: Some("3, 1".to_string()),
            ..ExportConfig::default()
        };
        let specs = config.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, DEFAULT_MULTI_EXPORT_NAME);
        assert_eq!(specs[0].form_ids.len(), 2);
    }
}
