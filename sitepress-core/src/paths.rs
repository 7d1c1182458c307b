//! Fixed per-project directory layout and confinement of logical paths.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const CONTENT_DIR: &str = "content";
pub const PUBLIC_DIR: &str = "public";
pub const ADDONS_DIR: &str = "addons";
pub const THEME_NAME: &str = "default";
pub const PAGE_TEMPLATE: &str = "page.html";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Path '{0}' escapes the content directory")]
    Escapes(String),
}

/// Well-known locations inside a project root
///
/// ```text
/// <root>/content/**
/// <root>/public/**
/// <root>/themes/default/templates/page.html
/// <root>/themes/default/static/**
/// <root>/addons/**
/// ```
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root.join(PUBLIC_DIR)
    }

    pub fn addons_dir(&self) -> PathBuf {
        self.root.join(ADDONS_DIR)
    }

    pub fn theme_dir(&self) -> PathBuf {
        self.root.join("themes").join(THEME_NAME)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.theme_dir().join("templates")
    }

    pub fn page_template(&self) -> PathBuf {
        self.templates_dir().join(PAGE_TEMPLATE)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.theme_dir().join("static")
    }

    pub fn content(&self) -> ContentDir {
        ContentDir::new(self.content_dir())
    }
}

/// A project's content directory; every logical path is resolved inside it
#[derive(Debug, Clone)]
pub struct ContentDir {
    root: PathBuf,
}

impl ContentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a `/`-separated logical path to a filesystem path
    ///
    /// Absolute paths, prefixes and `..` segments are rejected; `.` segments
    /// are dropped.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, PathError> {
        let normalized = normalize_relative(relative)?;
        let mut path = self.root.clone();
        for segment in normalized.split('/') {
            path.push(segment);
        }
        Ok(path)
    }

    /// Logical `/`-separated path of a file below this directory
    pub fn relative_of(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

/// Normalize a caller-supplied logical path to `a/b/c` form
///
/// ```
/// use sitepress_core::paths::normalize_relative;
///
/// assert_eq!(normalize_relative("./posts//hello.md").unwrap(), "posts/hello.md");
/// assert!(normalize_relative("../secrets").is_err());
/// ```
pub fn normalize_relative(relative: &str) -> Result<String, PathError> {
    let unified = relative.replace('\\', "/");
    let escapes = || PathError::Escapes(relative.to_string());

    if unified.starts_with('/') {
        return Err(escapes());
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(escapes()),
            s => {
                // Reject drive letters and other prefix forms on any platform
                let mut components = Path::new(s).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) if !s.contains(':') => segments.push(s),
                    _ => return Err(escapes()),
                }
            }
        }
    }

    if segments.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(segments.join("/"))
}

/// Parent directory of a logical path, `""` at the top level
pub fn logical_parent(relative: &str) -> &str {
    relative.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Join a logical directory and file name
pub fn logical_join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
