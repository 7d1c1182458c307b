//! Article commands: show a parsed article, save one under its title slug.

use super::{files::read_input, open_engine};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, SubsecRound, Utc};
use sitepress_core::models::parse_timestamp;
use sitepress_core::Article;
use std::path::{Path, PathBuf};

/// Arguments of `article save`
pub struct SaveArgs {
    pub title: String,
    pub date: Option<String>,
    pub body_file: Option<PathBuf>,
    pub original: Option<String>,
}

pub fn show_article(
    registry_path: &Path,
    project: &str,
    relative_path: &str,
    json: bool,
) -> Result<()> {
    let engine = open_engine(registry_path)?;
    let article = engine
        .parse_article(project, relative_path)
        .with_context(|| format!("Failed to parse article '{}'", relative_path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
        return Ok(());
    }

    println!("Title: {}", article.title);
    println!("Date:  {}", article.publish_date.to_rfc3339());
    println!("Path:  {}", article.relative_path);
    for (key, value) in article.extra.iter() {
        println!("{}: {}", key, serde_json::to_string(value)?);
    }
    println!();
    println!("{}", article.body);
    Ok(())
}

pub fn save_article(registry_path: &Path, project: &str, args: SaveArgs) -> Result<()> {
    let publish_date = match args.date.as_deref() {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| anyhow!("Invalid date '{}'", raw))?,
        None => now(),
    };
    let body = read_input(args.body_file.as_deref())?;

    let mut article = Article::new(args.title, publish_date);
    article.body = body;
    let original = args.original.unwrap_or_default();

    let engine = open_engine(registry_path)?;
    let saved = engine
        .save_article(project, &article, &original)
        .with_context(|| format!("Failed to save article '{}'", article.title))?;

    if let Some(old) = &saved.renamed_from {
        println!("✓ Saved {} (renamed from {})", saved.relative_path, old);
    } else {
        println!("✓ Saved {}", saved.relative_path);
    }
    if let Some(stale) = &saved.stale_original {
        eprintln!("warning: old file {} could not be removed", stale);
    }
    Ok(())
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().trunc_subsecs(0).into()
}
