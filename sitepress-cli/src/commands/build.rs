//! Build command implementation.

use super::open_engine;
use anyhow::{Context, Result};
use std::path::Path;

/// Build a registered project into its `public/` directory
pub fn build_project(registry_path: &Path, name: &str) -> Result<()> {
    let engine = open_engine(registry_path)?;
    let report = engine
        .build_project(name)
        .with_context(|| format!("Failed to build project '{}'", name))?;

    println!(
        "✓ Built '{}': {} pages, {} files, {} assets",
        name, report.pages_rendered, report.files_copied, report.assets_copied
    );
    Ok(())
}
