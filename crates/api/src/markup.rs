//! Markdown to HTML conversion.

use pulldown_cmark::{html, Options, Parser};

/// Render CommonMark (with tables and strikethrough) to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_renders_heading_and_paragraph() {
        let html = to_html(db::EMPTY_PAGE_MARKDOWN);
        assert!(html.contains("<h1>A new page</h1>"));
        assert!(html.contains("<p>Feel free to write in Markdown!</p>"));
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(to_html(""), "");
    }

    #[test]
    fn tables_are_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
