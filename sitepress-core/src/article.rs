//! Article persistence: reading articles by logical path and saving them
//! under a slug derived from the title.

use crate::{
    frontmatter::{render_document, Document, DocumentError},
    models::{parse_timestamp, Article, FrontMatter, FrontMatterValue},
    paths::{logical_join, logical_parent, normalize_relative, ContentDir, PathError},
    slug::slugify,
};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory new articles are created in
pub const POSTS_DIR: &str = "posts";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Article title cannot be empty or invalid")]
    EmptyTitle,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field '{field}' must be a {expected}, found {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Invalid article{}: {source}", .path.as_deref().map(|p| format!(" {p}")).unwrap_or_default())]
    Validation {
        path: Option<String>,
        #[source]
        source: ValidationError,
    },

    #[error("Could not serialize front matter: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ValidationError> for ArticleError {
    fn from(source: ValidationError) -> Self {
        ArticleError::Validation { path: None, source }
    }
}

/// Where a save ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedArticle {
    /// Final logical path of the article
    pub relative_path: String,

    /// Previous path when the title change moved the file
    pub renamed_from: Option<String>,

    /// Previous path that could not be deleted after a rename; the file is
    /// still on disk next to the new one
    pub stale_original: Option<String>,
}

impl Article {
    /// Map a generic document onto the article schema
    pub fn from_document(document: Document) -> Result<Self, ValidationError> {
        let Document {
            front_matter,
            body,
            relative_path,
        } = document;

        let title = match front_matter.get("title") {
            None | Some(FrontMatterValue::Null) => {
                return Err(ValidationError::MissingField("title"))
            }
            Some(FrontMatterValue::String(s)) => s.clone(),
            Some(other) => {
                return Err(ValidationError::InvalidField {
                    field: "title",
                    expected: "string",
                    found: other.type_name(),
                })
            }
        };
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }

        let publish_date = match front_matter.get("date") {
            None | Some(FrontMatterValue::Null) => {
                return Err(ValidationError::MissingField("date"))
            }
            Some(FrontMatterValue::Timestamp(ts)) => *ts,
            Some(FrontMatterValue::String(raw)) => {
                parse_timestamp(raw).ok_or(ValidationError::InvalidField {
                    field: "date",
                    expected: "timestamp",
                    found: "string",
                })?
            }
            Some(other) => {
                return Err(ValidationError::InvalidField {
                    field: "date",
                    expected: "timestamp",
                    found: other.type_name(),
                })
            }
        };

        let extra: FrontMatter = front_matter
            .into_iter()
            .filter(|(k, _)| k != "title" && k != "date")
            .collect();

        Ok(Article {
            title,
            publish_date,
            body,
            relative_path,
            extra,
        })
    }
}

/// Reads and writes documents inside one project's content directory
pub struct ArticleRepository {
    content: ContentDir,
}

impl ArticleRepository {
    pub fn new(content: ContentDir) -> Self {
        Self { content }
    }

    /// Repository for the project rooted at `project_root`
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(ContentDir::new(project_root.join(crate::paths::CONTENT_DIR)))
    }

    pub fn content(&self) -> &ContentDir {
        &self.content
    }

    /// Read a raw file below the content directory
    pub fn read_file(&self, relative_path: &str) -> Result<String, ArticleError> {
        let path = self.content.resolve(relative_path)?;
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ArticleError::NotFound(relative_path.to_string()),
            _ => ArticleError::Io { path, source },
        })
    }

    /// Write a raw file, creating intermediate directories
    pub fn write_file(&self, relative_path: &str, contents: &str) -> Result<(), ArticleError> {
        let path = self.content.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ArticleError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| ArticleError::Io { path, source })
    }

    /// Logical paths of all files below the content directory, sorted
    pub fn list_files(&self) -> Result<Vec<String>, ArticleError> {
        let root = self.content.root();
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                ArticleError::Io {
                    path,
                    source: e.into(),
                }
            })?;
            if entry.file_type().is_file() {
                if let Some(rel) = self.content.relative_of(entry.path()) {
                    files.push(rel);
                }
            }
        }
        Ok(files)
    }

    /// Parse a generic document
    pub fn read_document(&self, relative_path: &str) -> Result<Document, ArticleError> {
        let logical = normalize_relative(relative_path)?;
        let raw = self.read_file(&logical)?;
        Ok(Document::parse(&raw, logical)?)
    }

    /// Read a document and map it onto the article schema
    pub fn read_article(&self, relative_path: &str) -> Result<Article, ArticleError> {
        let document = self.read_document(relative_path)?;
        let path = document.relative_path.clone();
        Article::from_document(document)
            .map_err(|source| ArticleError::Validation {
                path: Some(path),
                source,
            })
    }

    /// Save an article, deriving its file name from the title
    ///
    /// A new article (empty `original_relative_path`) lands in
    /// `posts/<slug>.md`. An existing one is renamed within its directory when
    /// the slug of its title no longer matches its file name. The old file is
    /// removed on a best-effort basis; a failure is logged and reported in
    /// [`SavedArticle::stale_original`].
    pub fn save_article(
        &self,
        article: &Article,
        original_relative_path: &str,
    ) -> Result<SavedArticle, ArticleError> {
        let new_slug = slugify(&article.title);
        if new_slug.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let original = if original_relative_path.trim().is_empty() {
            None
        } else {
            Some(normalize_relative(original_relative_path)?)
        };

        let final_path = match &original {
            None => logical_join(POSTS_DIR, &format!("{new_slug}.md")),
            Some(orig) => {
                let original_slug = Path::new(orig)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if original_slug == new_slug {
                    orig.clone()
                } else {
                    logical_join(logical_parent(orig), &format!("{new_slug}.md"))
                }
            }
        };

        let renamed_from = original.filter(|orig| *orig != final_path);
        if renamed_from.is_some() || original_relative_path.trim().is_empty() {
            let target = self.content.resolve(&final_path)?;
            if target.exists() {
                tracing::warn!("Overwriting existing article at {}", final_path);
            }
        }

        let contents = render_document(&article.front_matter(), article.body.trim())?;
        self.write_file(&final_path, &contents)?;

        let mut stale_original = None;
        if let Some(old) = &renamed_from {
            tracing::info!("Renaming article, deleting old file: {}", old);
            let old_path = self.content.resolve(old)?;
            if let Err(e) = fs::remove_file(&old_path) {
                tracing::warn!(
                    "Could not delete old article {:?} after rename to {}: {}",
                    old_path,
                    final_path,
                    e
                );
                stale_original = Some(old.clone());
            }
        }

        Ok(SavedArticle {
            relative_path: final_path,
            renamed_from,
            stale_original,
        })
    }
}
