//! Markdown to HTML conversion.

pub mod headings;

use headings::HeadingIdTransformer;
use pulldown_cmark::{html, Event, Options, Parser};

/// Markdown processor with a fixed extension set
///
/// Rendering is total: malformed markdown is rendered best-effort, never
/// rejected. Output is an HTML fragment and is not sanitized.
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        options.insert(Options::ENABLE_DEFINITION_LIST);

        Self { options }
    }

    /// Convert a markdown body to an HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let mut events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();

        HeadingIdTransformer::new().transform(&mut events);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Render markdown with the default extension set
pub fn render_markdown(markdown: &str) -> String {
    MarkdownProcessor::new().render(markdown)
}
