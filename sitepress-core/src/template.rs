//! Page template loading and rendering.
//!
//! Templates are Tera templates. Go-style field actions such as
//! `{{ .Content }}` and `{{ .FrontMatter.title }}` are accepted too and are
//! rewritten to their Tera equivalents before parsing.

use crate::models::Page;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tera::{Context, Tera};
use thiserror::Error;

const TEMPLATE_NAME: &str = "page.html";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Could not read page template '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse page template '{path}': {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("Could not render page template '{path}': {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

static FIELD_ACTION: OnceLock<Regex> = OnceLock::new();

fn field_action() -> &'static Regex {
    FIELD_ACTION.get_or_init(|| {
        Regex::new(r"\{\{-?\s*\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*-?\}\}").unwrap()
    })
}

/// Rewrite Go-style `{{ .Field }}` actions into Tera expressions
///
/// `.Content` is already HTML, so it is marked safe. A front matter key a
/// page does not define renders as an empty string.
///
/// ```
/// use sitepress_core::template::translate_actions;
///
/// assert_eq!(translate_actions("<main>{{.Content}}</main>"), "<main>{{ Content | safe }}</main>");
/// assert_eq!(
///     translate_actions("{{ .FrontMatter.title }}"),
///     r#"{{ FrontMatter.title | default(value="") }}"#
/// );
/// ```
pub fn translate_actions(source: &str) -> String {
    field_action()
        .replace_all(source, |caps: &regex::Captures| {
            let field = &caps[1];
            if field == "Content" {
                "{{ Content | safe }}".to_string()
            } else if field.starts_with("FrontMatter.") {
                format!("{{{{ {field} | default(value=\"\") }}}}")
            } else {
                format!("{{{{ {field} }}}}")
            }
        })
        .into_owned()
}

/// A parsed page template, reused for every page of a build
pub struct PageTemplate {
    tera: Tera,
    path: PathBuf,
}

impl PageTemplate {
    /// Read and parse the template at `path`
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&source, path)
    }

    /// Parse template text; `path` labels errors
    pub fn from_source(source: &str, path: &Path) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, &translate_actions(source))
            .map_err(|source| TemplateError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            tera,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute the template against a page
    pub fn render(&self, page: &Page) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("FrontMatter", &page.front_matter);
        context.insert("Content", &page.html_content);

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|source| TemplateError::Render {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrontMatter;

    fn page(title: &str, html: &str) -> Page {
        let mut front_matter = FrontMatter::new();
        front_matter.insert("title", title);
        Page {
            front_matter,
            html_content: html.to_string(),
        }
    }

    fn template(source: &str) -> PageTemplate {
        PageTemplate::from_source(source, Path::new("page.html")).unwrap()
    }

    #[test]
    fn test_go_style_content() {
        let tpl = template("{{.Content}}");
        let out = tpl.render(&page("Hello", "<h1 id=\"hi\">Hi</h1>\n")).unwrap();
        assert_eq!(out, "<h1 id=\"hi\">Hi</h1>\n");
    }

    #[test]
    fn test_front_matter_is_escaped() {
        let tpl = template("<title>{{ .FrontMatter.title }}</title>{{ .Content }}");
        let out = tpl.render(&page("Fish & Chips", "<p>ok</p>")).unwrap();
        assert_eq!(out, "<title>Fish &amp; Chips</title><p>ok</p>");
    }

    #[test]
    fn test_native_tera_syntax() {
        let tpl = template(
            "{% if FrontMatter.title %}<h1>{{ FrontMatter.title }}</h1>{% endif %}{{ Content | safe }}",
        );
        let out = tpl.render(&page("Native", "<p>body</p>")).unwrap();
        assert_eq!(out, "<h1>Native</h1><p>body</p>");
    }

    #[test]
    fn test_trim_markers_are_accepted() {
        assert_eq!(translate_actions("{{- .Content -}}"), "{{ Content | safe }}");
    }

    #[test]
    fn test_invalid_template() {
        let err = PageTemplate::from_source("{% if %}", Path::new("themes/page.html"))
            .err()
            .unwrap();
        assert!(matches!(err, TemplateError::Invalid { .. }));
        assert!(err.to_string().contains("themes/page.html"));
    }

    #[test]
    fn test_missing_front_matter_key_renders_empty() {
        let tpl = template("<meta content=\"{{ .FrontMatter.description }}\">{{ .Content }}");
        let out = tpl.render(&page("x", "<p>ok</p>")).unwrap();
        assert_eq!(out, "<meta content=\"\"><p>ok</p>");
    }

    #[test]
    fn test_unknown_native_variable_is_render_error() {
        let tpl = template("{{ Missing.field }}");
        assert!(matches!(
            tpl.render(&page("x", "")),
            Err(TemplateError::Render { .. })
        ));
    }
}
