//! Site building: clean output, render content through the page template,
//! copy everything else, then copy theme static assets.

use crate::{
    frontmatter::{Document, DocumentError},
    markdown::MarkdownProcessor,
    models::Page,
    paths::ProjectLayout,
    template::{PageTemplate, TemplateError},
};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Phases of a build, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Cleaning,
    TemplateLoading,
    Walking,
    CopyingAssets,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildPhase::Cleaning => "cleaning",
            BuildPhase::TemplateLoading => "template loading",
            BuildPhase::Walking => "walking content",
            BuildPhase::CopyingAssets => "copying assets",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to clean public directory {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    TemplateInvalid(TemplateError),

    #[error("Build failed while {phase} at {path}: {source}")]
    Io {
        phase: BuildPhase,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Build failed while {phase}: {source}")]
    Walk {
        phase: BuildPhase,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Render(TemplateError),
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Render { .. } => BuildError::Render(err),
            other => BuildError::TemplateInvalid(other),
        }
    }
}

/// Counts reported by a successful build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub pages_rendered: usize,
    pub files_copied: usize,
    pub assets_copied: usize,
}

/// Builds one project's `public/` tree from its content and theme
///
/// Every build is a full rebuild. The first failure aborts the build and
/// whatever was already written stays on disk.
pub struct SiteBuilder {
    layout: ProjectLayout,
    processor: MarkdownProcessor,
}

impl SiteBuilder {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            layout: ProjectLayout::new(project_root),
            processor: MarkdownProcessor::new(),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Build the entire site
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();
        let public_dir = self.layout.public_dir();

        tracing::info!(phase = %BuildPhase::Cleaning, "Cleaning {:?}", public_dir);
        self.clean(&public_dir)?;

        tracing::info!(phase = %BuildPhase::TemplateLoading, "Loading page template");
        let template = PageTemplate::load(&self.layout.page_template())?;

        tracing::info!(phase = %BuildPhase::Walking, "Processing content files");
        self.walk_content(&template, &public_dir, &mut report)?;

        let static_dir = self.layout.static_dir();
        if static_dir.is_dir() {
            tracing::info!(phase = %BuildPhase::CopyingAssets, "Copying static assets");
            report.assets_copied = copy_tree(&static_dir, &public_dir, BuildPhase::CopyingAssets)?;
        } else {
            tracing::debug!("No static directory at {:?}; skipping assets", static_dir);
        }

        tracing::info!(
            "Built {} pages, copied {} files and {} assets",
            report.pages_rendered,
            report.files_copied,
            report.assets_copied
        );
        Ok(report)
    }

    fn clean(&self, public_dir: &Path) -> Result<(), BuildError> {
        let clean_err = |source| BuildError::Clean {
            path: public_dir.to_path_buf(),
            source,
        };

        match fs::remove_dir_all(public_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(clean_err(e)),
        }
        fs::create_dir_all(public_dir).map_err(clean_err)
    }

    fn walk_content(
        &self,
        template: &PageTemplate,
        public_dir: &Path,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let phase = BuildPhase::Walking;
        let content_dir = self.layout.content_dir();
        if !content_dir.is_dir() {
            return Err(BuildError::Io {
                phase,
                path: content_dir,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "content directory does not exist",
                ),
            });
        }

        for entry in WalkDir::new(&content_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| BuildError::Walk { phase, source })?;
            let rel = entry
                .path()
                .strip_prefix(&content_dir)
                .unwrap_or(entry.path());
            let dest = public_dir.join(rel);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                create_dir(&dest, phase)?;
            } else if file_type.is_file() {
                if is_markdown(entry.path()) {
                    let dest = dest.with_extension("html");
                    self.render_page(entry.path(), rel, &dest, template)?;
                    report.pages_rendered += 1;
                } else {
                    copy_file(entry.path(), &dest, phase)?;
                    report.files_copied += 1;
                }
            } else {
                tracing::debug!("Skipping non-regular entry {:?}", entry.path());
            }
        }

        Ok(())
    }

    /// Parse, render and template a single markdown file
    fn render_page(
        &self,
        source: &Path,
        rel: &Path,
        dest: &Path,
        template: &PageTemplate,
    ) -> Result<(), BuildError> {
        tracing::debug!("Processing markdown file: {:?}", source);
        let phase = BuildPhase::Walking;

        let raw = fs::read_to_string(source).map_err(|e| io_error(phase, source, e))?;
        let document = Document::parse(&raw, logical(rel))?;

        let page = Page {
            html_content: self.processor.render(&document.body),
            front_matter: document.front_matter,
        };
        let html = template.render(&page)?;

        if let Some(parent) = dest.parent() {
            create_dir(parent, phase)?;
        }
        fs::write(dest, html).map_err(|e| io_error(phase, dest, e))
    }
}

/// Build the project rooted at `project_root`
pub fn build_project(project_root: &Path) -> Result<BuildReport, BuildError> {
    SiteBuilder::new(project_root).build()
}

/// Markdown files are recognised by a case-sensitive `.md` extension
fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

fn logical(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn io_error(phase: BuildPhase, path: &Path, source: std::io::Error) -> BuildError {
    BuildError::Io {
        phase,
        path: path.to_path_buf(),
        source,
    }
}

fn create_dir(path: &Path, phase: BuildPhase) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|e| io_error(phase, path, e))
}

fn copy_file(src: &Path, dest: &Path, phase: BuildPhase) -> Result<(), BuildError> {
    if let Some(parent) = dest.parent() {
        create_dir(parent, phase)?;
    }
    fs::copy(src, dest).map_err(|e| io_error(phase, src, e))?;
    Ok(())
}

/// Recursively copy `src` into `dest`, returning the number of files copied
fn copy_tree(src: &Path, dest: &Path, phase: BuildPhase) -> Result<usize, BuildError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| BuildError::Walk { phase, source })?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            create_dir(&target, phase)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target, phase)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn scaffold(root: &Path, template: &str) {
        fs::create_dir_all(root.join("content")).unwrap();
        write(root, "themes/default/templates/page.html", template);
    }

    #[test]
    fn test_markdown_extension_is_case_sensitive() {
        assert!(is_markdown(Path::new("a/b.md")));
        assert!(!is_markdown(Path::new("a/b.MD")));
        assert!(!is_markdown(Path::new("a/b.markdown")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn test_build_renders_and_copies() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        scaffold(root, "<title>{{ .FrontMatter.title }}</title>{{ .Content }}");
        write(root, "content/hello.md", "---\ntitle: Hello\n---\n\n# Hi");
        write(root, "content/posts/second.md", "---\ntitle: Second\n---\nText");
        write(root, "content/images/logo.svg", "<svg/>");
        write(root, "themes/default/static/css/site.css", "body{}");

        let report = SiteBuilder::new(root).build().unwrap();
        assert_eq!(
            report,
            BuildReport {
                pages_rendered: 2,
                files_copied: 1,
                assets_copied: 1,
            }
        );

        let hello = fs::read_to_string(root.join("public/hello.html")).unwrap();
        assert!(hello.contains("<title>Hello</title>"));
        assert!(hello.contains(r#"<h1 id="hi">Hi</h1>"#));
        assert!(root.join("public/posts/second.html").exists());
        assert_eq!(
            fs::read(root.join("public/images/logo.svg")).unwrap(),
            b"<svg/>"
        );
        assert!(root.join("public/css/site.css").exists());
    }

    #[test]
    fn test_optional_front_matter_key_missing_on_one_page() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        scaffold(
            root,
            r#"<meta name="description" content="{{ .FrontMatter.description }}">{{ .Content }}"#,
        );
        write(root, "content/a.md", "---\ntitle: A\ndescription: About A\n---\nA");
        write(root, "content/b.md", "---\ntitle: B\n---\nB");

        let report = SiteBuilder::new(root).build().unwrap();
        assert_eq!(report.pages_rendered, 2);

        let a = fs::read_to_string(root.join("public/a.html")).unwrap();
        assert!(a.contains(r#"content="About A""#));
        let b = fs::read_to_string(root.join("public/b.html")).unwrap();
        assert!(b.contains(r#"content="""#));
        assert!(b.contains("<p>B</p>"));
    }

    #[test]
    fn test_uppercase_md_is_copied_verbatim() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        scaffold(root, "{{ .Content }}");
        write(root, "content/NOTES.MD", "# not rendered");

        let report = SiteBuilder::new(root).build().unwrap();
        assert_eq!(report.pages_rendered, 0);
        assert_eq!(
            fs::read_to_string(root.join("public/NOTES.MD")).unwrap(),
            "# not rendered"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_content_is_followed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        scaffold(root, "{{ .Content }}");
        write(root, "shared/logo.svg", "<svg/>");
        write(root, "shared/intro.md", "---\ntitle: Intro\n---\n# Intro");
        std::os::unix::fs::symlink(root.join("shared/logo.svg"), root.join("content/logo.svg"))
            .unwrap();
        std::os::unix::fs::symlink(root.join("shared/intro.md"), root.join("content/intro.md"))
            .unwrap();

        let report = SiteBuilder::new(root).build().unwrap();
        assert_eq!(report.pages_rendered, 1);
        assert_eq!(report.files_copied, 1);
        assert_eq!(
            fs::read_to_string(root.join("public/logo.svg")).unwrap(),
            "<svg/>"
        );
        assert!(root.join("public/intro.html").is_file());
    }

    #[test]
    fn test_empty_content_directories_are_mirrored() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        scaffold(root, "{{ .Content }}");
        fs::create_dir_all(root.join("content/drafts/empty")).unwrap();

        SiteBuilder::new(root).build().unwrap();
        assert!(root.join("public/drafts/empty").is_dir());
    }

    #[test]
    fn test_invalid_template_aborts_before_walking() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        scaffold(root, "{% for %}");
        write(root, "content/hello.md", "---\ntitle: Hello\n---\nHi");

        let err = SiteBuilder::new(root).build().unwrap_err();
        assert!(matches!(err, BuildError::TemplateInvalid(_)));
        assert!(root.join("public").is_dir());
        assert!(!root.join("public/hello.html").exists());
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("content")).unwrap();

        let err = SiteBuilder::new(root).build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::TemplateInvalid(TemplateError::Read { .. })
        ));
    }

    #[test]
    fn test_malformed_document_short_circuits() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        scaffold(root, "{{ .Content }}");
        write(root, "content/a.md", "---\ntitle: A\n---\nfine");
        write(root, "content/b.md", "no front matter at all");
        write(root, "content/c.md", "---\ntitle: C\n---\nnever reached");

        let err = SiteBuilder::new(root).build().unwrap_err();
        match err {
            BuildError::Document(DocumentError::MalformedFrontMatter { path }) => {
                assert_eq!(path, "b.md")
            }
            other => panic!("expected MalformedFrontMatter, got {other:?}"),
        }
        // Output written before the failure is left in place
        assert!(root.join("public/a.html").exists());
        assert!(!root.join("public/c.html").exists());
    }

    #[test]
    fn test_missing_content_directory_fails() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "themes/default/templates/page.html", "{{ .Content }}");

        let err = SiteBuilder::new(root).build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Io {
                phase: BuildPhase::Walking,
                ..
            }
        ));
    }
}
