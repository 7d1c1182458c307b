//! Project registry: the list of known projects, persisted as JSON.

use crate::models::Project;
use crate::paths::{ProjectLayout, PAGE_TEMPLATE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Starter template written into new projects
pub const STARTER_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ FrontMatter.title | default(value="Untitled") }}</title>
</head>
<body>
  <main>
{{ .Content }}
  </main>
</body>
</html>
"#;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Project '{0}' not found")]
    NotFound(String),

    #[error("Project with name '{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid project name '{0}'")]
    InvalidName(String),

    #[error("Failed to read registry file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves a project name to its root directory
pub trait ProjectResolver {
    fn resolve(&self, name: &str) -> Result<Project, RegistryError>;
}

/// On-disk registry schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    projects: Vec<Project>,
}

/// Registry of projects backed by a JSON file
#[derive(Debug, Clone)]
pub struct Registry {
    projects: Vec<Project>,
    path: PathBuf,
}

impl Registry {
    /// Load the registry; a missing file yields an empty registry
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_path_buf();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No registry at {:?}; starting empty", path);
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(RegistryError::Read { path, source }),
        };

        let file: RegistryFile =
            serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            projects: file.projects,
            path,
        })
    }

    /// An empty registry that will be saved to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            projects: Vec::new(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn find(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Write the registry back to its file, creating parent directories
    pub fn save(&self) -> Result<(), RegistryError> {
        let file = RegistryFile {
            projects: self.projects.clone(),
        };
        let data = serde_json::to_string_pretty(&file).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| RegistryError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, data).map_err(|source| RegistryError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Create a project directory skeleton under `parent` and register it
    pub fn add_project(&mut self, name: &str, parent: &Path) -> Result<Project, RegistryError> {
        validate_name(name)?;
        if self.find(name).is_some() {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }

        let root = absolute(&parent.join(name)).map_err(|source| RegistryError::Write {
            path: parent.join(name),
            source,
        })?;
        tracing::info!("Creating new project '{}' at: {:?}", name, root);
        scaffold_project(&root)?;

        let project = Project {
            name: name.to_string(),
            path: root,
        };
        self.projects.push(project.clone());
        self.save()?;
        Ok(project)
    }
}

impl ProjectResolver for Registry {
    fn resolve(&self, name: &str) -> Result<Project, RegistryError> {
        self.find(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}

/// Default registry location
///
/// `$XDG_CONFIG_HOME/sitepress/projects.json`, then
/// `$HOME/.config/sitepress/projects.json`, then `./projects.json`.
pub fn default_registry_path() -> PathBuf {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        });

    match config_home {
        Some(dir) => dir.join("sitepress").join("projects.json"),
        None => PathBuf::from("projects.json"),
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', ':'])
    {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn scaffold_project(root: &Path) -> Result<(), RegistryError> {
    let layout = ProjectLayout::new(root);
    let dirs = [
        layout.content_dir(),
        layout.public_dir(),
        layout.templates_dir().join("partials"),
        layout.static_dir().join("css"),
        layout.static_dir().join("js"),
        layout.addons_dir(),
    ];

    for dir in &dirs {
        fs::create_dir_all(dir).map_err(|source| RegistryError::Write {
            path: dir.clone(),
            source,
        })?;
    }

    let template = layout.templates_dir().join(PAGE_TEMPLATE);
    if !template.exists() {
        fs::write(&template, STARTER_TEMPLATE).map_err(|source| RegistryError::Write {
            path: template.clone(),
            source,
        })?;
    }
    Ok(())
}
