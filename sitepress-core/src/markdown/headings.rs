//! Automatic `id` attributes on headings.

use crate::slug::anchor_slug;
use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use std::collections::HashSet;

/// Fallback id for headings whose text produces an empty slug
const FALLBACK_ID: &str = "section";

/// Assigns anchor ids to headings that don't carry an explicit `{#id}`
#[derive(Default)]
pub struct HeadingIdTransformer {
    used: HashSet<String>,
}

impl HeadingIdTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill in missing heading ids in place
    ///
    /// Ids are unique within the document: repeated headings get `-1`, `-2`, ...
    pub fn transform(&mut self, events: &mut [Event<'_>]) {
        for event in events.iter() {
            if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
                self.used.insert(id.to_string());
            }
        }

        for idx in 0..events.len() {
            let needs_id = matches!(&events[idx], Event::Start(Tag::Heading { id: None, .. }));
            if !needs_id {
                continue;
            }

            let text = heading_text(&events[idx + 1..]);
            let unique = self.unique_id(&text);
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[idx] {
                *id = Some(CowStr::from(unique));
            }
        }
    }

    fn unique_id(&mut self, text: &str) -> String {
        let mut base = anchor_slug(text);
        if base.is_empty() {
            base = FALLBACK_ID.to_string();
        }

        let mut candidate = base.clone();
        let mut n = 0;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Plain text of a heading, read from the events following its start tag
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{html, Options, Parser};

    fn render(md: &str) -> String {
        let mut events: Vec<Event> =
            Parser::new_ext(md, Options::ENABLE_HEADING_ATTRIBUTES).collect();
        HeadingIdTransformer::new().transform(&mut events);
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    #[test]
    fn test_inline_markup_contributes_text() {
        let html = render("## Using `cargo` *well*");
        assert!(html.contains(r#"<h2 id="using-cargo-well">"#));
    }

    #[test]
    fn test_duplicate_headings_are_numbered() {
        let html = render("# Notes\n\n# Notes\n\n# Notes\n");
        assert!(html.contains(r#"<h1 id="notes">"#));
        assert!(html.contains(r#"<h1 id="notes-1">"#));
        assert!(html.contains(r#"<h1 id="notes-2">"#));
    }

    #[test]
    fn test_explicit_id_is_kept_and_reserved() {
        let html = render("# Intro {#intro}\n\n# Intro\n");
        assert!(html.contains(r#"<h1 id="intro">Intro</h1>"#));
        assert!(html.contains(r#"<h1 id="intro-1">Intro</h1>"#));
    }

    #[test]
    fn test_symbol_only_heading_falls_back() {
        let html = render("# ***\n\n# ?!\n");
        assert!(html.contains(r#"id="section""#));
    }
}
