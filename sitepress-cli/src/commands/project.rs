//! Project command implementation.

use anyhow::{Context, Result};
use sitepress_core::Registry;
use std::path::Path;

/// Scaffold a new project under `parent` (default: current directory) and register it
pub fn new_project(registry_path: &Path, name: &str, parent: Option<&Path>) -> Result<()> {
    let parent = parent.unwrap_or_else(|| Path::new("."));
    let mut registry = Registry::load(registry_path)
        .with_context(|| format!("Failed to load registry {:?}", registry_path))?;

    let project = registry
        .add_project(name, parent)
        .with_context(|| format!("Failed to create project '{}'", name))?;

    println!("✓ Created project '{}' at {:?}", project.name, project.path);
    println!("  - Write markdown in content/");
    println!("  - Edit themes/default/templates/page.html to change the layout");
    Ok(())
}

/// Print registered projects
pub fn list_projects(registry_path: &Path, json: bool) -> Result<()> {
    let registry = Registry::load(registry_path)
        .with_context(|| format!("Failed to load registry {:?}", registry_path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(registry.projects())?);
        return Ok(());
    }

    if registry.projects().is_empty() {
        println!("No projects registered in {:?}", registry.path());
        return Ok(());
    }

    for project in registry.projects() {
        println!("{}\t{}", project.name, project.path.display());
    }
    Ok(())
}
