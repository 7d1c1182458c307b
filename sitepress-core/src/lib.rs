//! # sitepress-core
//!
//! Core library for sitepress, a manager for static website projects.
//!
//! A project is a directory holding markdown `content/`, a theme under
//! `themes/default/`, and the generated `public/` tree. This crate parses
//! front matter documents, renders markdown, builds sites through a page
//! template, and persists articles under title-derived slugs.

pub mod article;
pub mod builder;
pub mod engine;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod paths;
pub mod registry;
pub mod slug;
pub mod template;

pub use article::{ArticleError, ArticleRepository, SavedArticle, ValidationError};
pub use builder::{build_project, BuildError, BuildPhase, BuildReport, SiteBuilder};
pub use engine::{Engine, EngineError, ProjectLocks};
pub use frontmatter::{Document, DocumentError};
pub use markdown::{render_markdown, MarkdownProcessor};
pub use models::{Article, FrontMatter, FrontMatterValue, Page, Project};
pub use paths::{ContentDir, PathError, ProjectLayout};
pub use registry::{default_registry_path, ProjectResolver, Registry, RegistryError};
pub use slug::slugify;
pub use template::{PageTemplate, TemplateError};
