//! Registry of named export definitions.
//!
//! The registry is built once at startup from configuration and passed to the
//! export entry point. Names are unique; the first registration of a name wins.

use mfx_model::{ExportDefinition, ExportSpec};
use tracing::info;

use crate::error::{RegistryError, Result};
use crate::resolver::{ColumnResolver, FormSource};

/// Named export definitions in registration order.
#[derive(Debug, Clone, Default)]
pub struct ExportRegistry {
    exports: Vec<ExportDefinition>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolved definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] when the name is taken; the
    /// existing definition is kept.
    pub fn register(&mut self, definition: ExportDefinition) -> Result<()> {
        if self.lookup(definition.name()).is_some() {
            return Err(RegistryError::DuplicateName {
                name: definition.name().to_string(),
            });
        }
        info!(
            export_name = %definition.name(),
            column_count = definition.columns().len(),
            "registered export"
        );
        self.exports.push(definition);
        Ok(())
    }

    /// Resolve a spec against the host's forms and register the result.
    pub fn register_spec(&mut self, spec: &ExportSpec, forms: &dyn FormSource) -> Result<()> {
        if self.lookup(&spec.name).is_some() {
            return Err(RegistryError::DuplicateName {
                name: spec.name.clone(),
            });
        }
        let definition = ColumnResolver::resolve(spec, forms)?;
        self.register(definition)
    }

    pub fn lookup(&self, name: &str) -> Option<&ExportDefinition> {
        self.exports.iter().find(|export| export.name() == name)
    }

    /// Registered export names, in registration order.
    pub fn list_names(&self) -> Vec<&str> {
        self.exports.iter().map(ExportDefinition::name).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExportDefinition> {
        self.exports.iter()
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}
