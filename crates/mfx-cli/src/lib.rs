//! CLI library components for multi-form exports.

pub mod config;
pub mod logging;
