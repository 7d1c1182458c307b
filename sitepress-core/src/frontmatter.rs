//! Two-part document format: YAML front matter followed by a markdown body.
//!
//! ```text
//! ---
//! title: Hello
//! ---
//!
//! # Hi
//! ```

use crate::models::{FrontMatter, MetadataError};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid front matter format in {path}")]
    MalformedFrontMatter { path: String },

    #[error("Could not parse front matter for {path}: {source}")]
    InvalidMetadata {
        path: String,
        #[source]
        source: MetadataError,
    },
}

/// A parsed content file
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
    pub relative_path: String,
}

impl Document {
    /// Parse raw file text; `relative_path` is only used to label errors
    /// and the resulting document.
    pub fn parse(raw: &str, relative_path: impl Into<String>) -> Result<Self, DocumentError> {
        let relative_path = relative_path.into();
        let (front_matter, body) = parse_front_matter(raw, &relative_path)?;
        Ok(Self {
            front_matter,
            body,
            relative_path,
        })
    }

    /// Serialize back into the on-disk format
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        render_document(&self.front_matter, &self.body)
    }
}

/// Split raw text into (metadata block, body) at the two delimiter lines
///
/// Returns `None` unless the text opens with a delimiter line and a second
/// delimiter line follows.
pub fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = raw.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let meta_start = first.len();
    let mut offset = meta_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let metadata = &raw[meta_start..offset];
            let body = &raw[offset + line.len()..];
            return Some((metadata, body));
        }
        offset += line.len();
    }

    None
}

/// Parse front matter and body from raw document text
///
/// The body is returned with surrounding whitespace trimmed.
///
/// # Example
///
/// ```
/// use sitepress_core::frontmatter::parse_front_matter;
///
/// let content = "---\ntitle: My Post\ndraft: true\n---\n\n# Hello World\n";
///
/// let (fm, body) = parse_front_matter(content, "posts/my-post.md").unwrap();
/// assert_eq!(fm.get("title").and_then(|v| v.as_str()), Some("My Post"));
/// assert_eq!(body, "# Hello World");
/// ```
pub fn parse_front_matter(
    raw: &str,
    path: &str,
) -> Result<(FrontMatter, String), DocumentError> {
    let (metadata, body) =
        split_front_matter(raw).ok_or_else(|| DocumentError::MalformedFrontMatter {
            path: path.to_string(),
        })?;

    let invalid = |source: MetadataError| DocumentError::InvalidMetadata {
        path: path.to_string(),
        source,
    };

    let front_matter = if metadata.trim().is_empty() {
        FrontMatter::new()
    } else {
        let value: serde_yaml::Value =
            serde_yaml::from_str(metadata).map_err(|e| invalid(MetadataError::Yaml(e)))?;
        FrontMatter::from_yaml(value).map_err(invalid)?
    };

    Ok((front_matter, body.trim().to_string()))
}

/// Render front matter and body into `---\n<yaml>---\n\n<body>\n`
pub fn render_document(front_matter: &FrontMatter, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = if front_matter.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(front_matter)?
    };

    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrontMatterValue;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
title: Test Post
description: A test post
date: 2025-01-01
tags:
  - rust
  - programming
---

# Hello World

This is the content."#;

        let doc = Document::parse(content, "posts/test.md").unwrap();
        let fm = &doc.front_matter;
        assert_eq!(fm.get("title").and_then(|v| v.as_str()), Some("Test Post"));
        assert_eq!(
            fm.get("description").and_then(|v| v.as_str()),
            Some("A test post")
        );
        assert_eq!(fm.get("date").and_then(|v| v.as_str()), Some("2025-01-01"));
        assert_eq!(
            fm.get("tags"),
            Some(&FrontMatterValue::List(vec![
                "rust".into(),
                "programming".into()
            ]))
        );
        assert!(doc.body.starts_with("# Hello World"));
        assert!(doc.body.ends_with("This is the content."));
        assert_eq!(doc.relative_path, "posts/test.md");
    }

    #[test]
    fn test_parse_empty_metadata_block() {
        let (fm, body) = parse_front_matter("---\n---\nJust a body\n", "a.md").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Just a body");
    }

    #[test]
    fn test_body_may_contain_rules() {
        let content = "---\ntitle: Rules\n---\nabove\n\n---\n\nbelow\n";
        let (_, body) = parse_front_matter(content, "a.md").unwrap();
        assert_eq!(body, "above\n\n---\n\nbelow");
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\n\r\nBody\r\n";
        let (fm, body) = parse_front_matter(content, "win.md").unwrap();
        assert_eq!(fm.get("title").and_then(|v| v.as_str()), Some("Windows"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_no_frontmatter_is_malformed() {
        let content = "# Just Content\n\nNo frontmatter here.";
        match parse_front_matter(content, "bare.md") {
            Err(DocumentError::MalformedFrontMatter { path }) => assert_eq!(path, "bare.md"),
            other => panic!("expected MalformedFrontMatter, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_frontmatter_is_malformed() {
        let content = "---\ntitle: Never closed\n\nBody";
        assert!(matches!(
            parse_front_matter(content, "open.md"),
            Err(DocumentError::MalformedFrontMatter { .. })
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let content = r#"---
title: Test
invalid yaml: [unclosed
---

Content."#;

        match parse_front_matter(content, "broken.md") {
            Err(DocumentError::InvalidMetadata { path, .. }) => assert_eq!(path, "broken.md"),
            other => panic!("expected InvalidMetadata, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_metadata_rejected() {
        let content = "---\njust a string\n---\nBody";
        assert!(matches!(
            parse_front_matter(content, "scalar.md"),
            Err(DocumentError::InvalidMetadata {
                source: MetadataError::NotAMapping(_),
                ..
            })
        ));
    }

    #[test]
    fn test_render_then_parse() {
        let mut fm = FrontMatter::new();
        fm.insert("title", "Round Trip");
        fm.insert("weight", 10i64);
        fm.insert("draft", false);

        let rendered = render_document(&fm, "Some *body* text.").unwrap();
        assert!(rendered.starts_with("---\ntitle: Round Trip\n"));
        assert!(rendered.contains("---\n\nSome *body* text.\n"));

        let doc = Document::parse(&rendered, "rt.md").unwrap();
        assert_eq!(doc.front_matter, fm);
        assert_eq!(doc.body, "Some *body* text.");
    }
}
