//! Markdown body rendering.
//!
//! Thin wrapper over pulldown-cmark with the GFM extensions content authors
//! expect. Raw HTML passes through unchanged, so root-relative links written
//! as HTML are rewritten by the path pipeline like markdown links.

use pulldown_cmark::{Options, Parser, html::push_html};

/// Render markdown to HTML.
pub fn render(markdown: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES;

    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 2);
    push_html(&mut html, parser);
    html
}
