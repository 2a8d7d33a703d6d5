//! CLI subcommand implementations.

pub mod hash;
pub mod reviews;
pub mod sites;

use std::path::Path;

use anyhow::{Context, Result};
use kuchikomi_lib::config;
use kuchikomi_lib::AdapterRegistry;

/// Built-in adapters plus any file given on the command line or in
/// `KUCHIKOMI_ADAPTERS`.
pub(crate) fn load_registry(adapters: Option<&Path>) -> Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::builtin();
    let path = adapters
        .map(Path::to_path_buf)
        .or_else(config::adapters_path_from_env);
    if let Some(path) = path {
        registry
            .extend_from_file(&path)
            .with_context(|| format!("loading adapters from {}", path.display()))?;
    }
    Ok(registry)
}
