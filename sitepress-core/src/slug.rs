//! Slug generation for file names and heading anchors.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static NON_SLUG_RUN: OnceLock<Regex> = OnceLock::new();
static HYPHEN_RUN: OnceLock<Regex> = OnceLock::new();

fn non_slug_run() -> &'static Regex {
    NON_SLUG_RUN.get_or_init(|| Regex::new(r"[^a-z0-9-]+").unwrap())
}

fn hyphen_run() -> &'static Regex {
    HYPHEN_RUN.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Convert a title to a filesystem-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace every run of characters outside `[a-z0-9-]` with a single hyphen
/// - Trim leading/trailing hyphens
///
/// An empty result is never a valid file name; callers must reject it.
///
/// # Examples
///
/// ```
/// use sitepress_core::slugify;
///
/// assert_eq!(slugify("My Post!"), "my-post");
/// assert_eq!(slugify("C++ Programming"), "c-programming");
/// assert_eq!(slugify("   "), "");
/// ```
pub fn slugify(title: &str) -> String {
    let lowercased = title.to_lowercase();
    let replaced = non_slug_run().replace_all(&lowercased, "-");
    replaced.trim_matches('-').to_string()
}

/// Convert heading text to an anchor id
///
/// Unlike [`slugify`], Unicode letters survive, and punctuation is dropped
/// rather than turned into a separator:
///
/// ```
/// use sitepress_core::slug::anchor_slug;
///
/// assert_eq!(anchor_slug("What's new?"), "whats-new");
/// assert_eq!(anchor_slug("Café au lait"), "café-au-lait");
/// ```
pub fn anchor_slug(input: &str) -> String {
    let lowercased = input.to_lowercase();

    let cleaned = lowercased
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' || c == '-' {
                Some("-")
            } else if c.is_alphanumeric() {
                Some(g)
            } else {
                None
            }
        })
        .collect::<String>();

    let collapsed = hyphen_run().replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}
