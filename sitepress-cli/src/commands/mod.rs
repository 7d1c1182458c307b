//! CLI command implementations.

pub mod article;
pub mod build;
pub mod files;
pub mod project;
pub mod serve;

pub use article::{save_article, show_article, SaveArgs};
pub use build::build_project;
pub use files::{cat_file, list_files, write_file};
pub use project::{list_projects, new_project};
pub use serve::serve;

use anyhow::{Context, Result};
use sitepress_core::{Engine, Registry};
use std::path::Path;

/// Load the registry and wrap it in an engine
pub fn open_engine(registry_path: &Path) -> Result<Engine<Registry>> {
    tracing::debug!("Loading registry from {:?}", registry_path);
    let registry = Registry::load(registry_path)
        .with_context(|| format!("Failed to load registry {:?}", registry_path))?;
    Ok(Engine::new(registry))
}
