//! Raw content file commands.

use super::open_engine;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

pub fn list_files(registry_path: &Path, project: &str) -> Result<()> {
    let engine = open_engine(registry_path)?;
    let files = engine
        .list_content_files(project)
        .with_context(|| format!("Failed to list files of '{}'", project))?;

    for file in files {
        println!("{}", file);
    }
    Ok(())
}

pub fn cat_file(registry_path: &Path, project: &str, relative_path: &str) -> Result<()> {
    let engine = open_engine(registry_path)?;
    let content = engine
        .read_file_content(project, relative_path)
        .with_context(|| format!("Failed to read '{}'", relative_path))?;

    io::stdout().write_all(content.as_bytes())?;
    Ok(())
}

/// Write a content file from `from`, or stdin when absent
pub fn write_file(
    registry_path: &Path,
    project: &str,
    relative_path: &str,
    from: Option<&Path>,
) -> Result<()> {
    let content = read_input(from)?;
    let engine = open_engine(registry_path)?;
    engine
        .write_file_content(project, relative_path, &content)
        .with_context(|| format!("Failed to write '{}'", relative_path))?;

    println!("✓ Wrote {}", relative_path);
    Ok(())
}

/// Read a whole file, or stdin when no path is given
pub(crate) fn read_input(from: Option<&Path>) -> Result<String> {
    match from {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
