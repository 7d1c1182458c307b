//! Engine facade: the operations exposed to the CLI and HTTP layers.
//!
//! Every operation resolves the project through a [`ProjectResolver`] and
//! runs while holding that project's lock, so builds and saves on the same
//! project never interleave.

use crate::{
    article::{ArticleError, ArticleRepository, SavedArticle},
    builder::{BuildError, BuildReport, SiteBuilder},
    frontmatter::DocumentError,
    models::{Article, Project},
    registry::{ProjectResolver, RegistryError},
};
use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Article(#[from] ArticleError),

    #[error("Build failed for project '{project}': {source}")]
    Build {
        project: String,
        #[source]
        source: BuildError,
    },
}

impl EngineError {
    /// Unknown project or missing file
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::Registry(RegistryError::NotFound(_))
                | EngineError::Article(ArticleError::NotFound(_))
        )
    }

    /// Caller-supplied input was rejected
    pub fn is_validation(&self) -> bool {
        match self {
            EngineError::Article(err) => matches!(
                err,
                ArticleError::Validation { .. }
                    | ArticleError::Path(_)
                    | ArticleError::Document(
                        DocumentError::MalformedFrontMatter { .. }
                            | DocumentError::InvalidMetadata { .. }
                    )
            ),
            EngineError::Registry(RegistryError::InvalidName(_)) => true,
            _ => false,
        }
    }
}

/// Per-project mutual exclusion, keyed by project name
#[derive(Default)]
pub struct ProjectLocks {
    busy: Mutex<HashSet<String>>,
    released: Condvar,
}

/// Held for the duration of one engine operation; releases on drop
pub struct ProjectGuard<'a> {
    locks: &'a ProjectLocks,
    project: String,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the project is free, then hold it until the guard drops
    pub fn acquire(&self, project: &str) -> ProjectGuard<'_> {
        let mut busy = self.busy.lock();
        while busy.contains(project) {
            self.released.wait(&mut busy);
        }
        busy.insert(project.to_string());
        ProjectGuard {
            locks: self,
            project: project.to_string(),
        }
    }

    /// Acquire without blocking; `None` if another operation holds it
    pub fn try_acquire(&self, project: &str) -> Option<ProjectGuard<'_>> {
        let mut busy = self.busy.lock();
        if !busy.insert(project.to_string()) {
            return None;
        }
        Some(ProjectGuard {
            locks: self,
            project: project.to_string(),
        })
    }
}

impl Drop for ProjectGuard<'_> {
    fn drop(&mut self) {
        self.locks.busy.lock().remove(&self.project);
        self.locks.released.notify_all();
    }
}

/// Entry point for all project operations
pub struct Engine<R> {
    resolver: R,
    locks: ProjectLocks,
}

impl<R: ProjectResolver> Engine<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            locks: ProjectLocks::new(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn locks(&self) -> &ProjectLocks {
        &self.locks
    }

    fn with_project<T>(
        &self,
        name: &str,
        op: impl FnOnce(&Project) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let project = self.resolver.resolve(name)?;
        let _guard = self.locks.acquire(&project.name);
        op(&project)
    }

    /// Rebuild the project's `public/` tree
    pub fn build_project(&self, name: &str) -> Result<BuildReport, EngineError> {
        self.with_project(name, |project| {
            tracing::info!("Starting build for project: {}", project.name);
            SiteBuilder::new(&project.path)
                .build()
                .map_err(|source| EngineError::Build {
                    project: project.name.clone(),
                    source,
                })
        })
    }

    pub fn read_file_content(&self, name: &str, relative_path: &str) -> Result<String, EngineError> {
        self.with_project(name, |project| {
            Ok(ArticleRepository::for_project(&project.path).read_file(relative_path)?)
        })
    }

    /// Write a content file, creating intermediate directories
    pub fn write_file_content(
        &self,
        name: &str,
        relative_path: &str,
        content: &str,
    ) -> Result<(), EngineError> {
        self.with_project(name, |project| {
            ArticleRepository::for_project(&project.path).write_file(relative_path, content)?;
            tracing::info!("File '{}' saved in project '{}'", relative_path, project.name);
            Ok(())
        })
    }

    pub fn parse_article(&self, name: &str, relative_path: &str) -> Result<Article, EngineError> {
        self.with_project(name, |project| {
            Ok(ArticleRepository::for_project(&project.path).read_article(relative_path)?)
        })
    }

    pub fn save_article(
        &self,
        name: &str,
        article: &Article,
        original_relative_path: &str,
    ) -> Result<SavedArticle, EngineError> {
        self.with_project(name, |project| {
            Ok(ArticleRepository::for_project(&project.path)
                .save_article(article, original_relative_path)?)
        })
    }

    /// Sorted logical paths of every file in the content directory
    pub fn list_content_files(&self, name: &str) -> Result<Vec<String>, EngineError> {
        self.with_project(name, |project| {
            Ok(ArticleRepository::for_project(&project.path).list_files()?)
        })
    }
}
