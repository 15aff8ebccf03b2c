//! Export registry and column resolution.

#![deny(unsafe_code)]

mod error;
mod registry;
mod resolver;
mod settings;

pub use error::{RegistryError, Result};
pub use registry::ExportRegistry;
pub use resolver::{ColumnResolver, FormSource};
pub use settings::{DEFAULT_MULTI_EXPORT_NAME, parse_form_id_list};
