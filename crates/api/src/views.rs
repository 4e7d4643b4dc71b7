//! Askama page templates.
//!
//! Templates live in `crates/api/templates/` and are compiled into the crate.

use askama::Template;
use axum::response::Html;

use crate::error::ApiError;

/// URL path of the page called `name`, percent-encoded so it is always a
/// valid `Location` header and link target.
pub fn wiki_path(name: &str) -> String {
    format!("/wiki/{}", urlencoding::encode(name))
}

pub struct PageLink {
    pub name: String,
    pub href: String,
}

impl PageLink {
    pub fn new(name: String) -> Self {
        let href = wiki_path(&name);
        Self { name, href }
    }
}

/// `GET /`
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub pages: Vec<PageLink>,
}

/// `GET /wiki/{page}`
///
/// The edit form echoes `id` and `new_page` back to `/save`, which decides
/// between insert and update from those two fields alone.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: String,
    pub id: i64,
    pub new_page: bool,
    pub raw_content: String,
    /// Already-rendered HTML, inserted unescaped.
    pub content: String,
    pub timestamp: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub status: u16,
    pub reason: &'static str,
    pub message: String,
}

/// Render a template into a handler response.
pub fn render<T: Template>(tmpl: T) -> Result<Html<String>, ApiError> {
    Ok(Html(tmpl.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(new_page: bool) -> PageTemplate {
        PageTemplate {
            title: "Home".into(),
            id: if new_page { -1 } else { 7 },
            new_page,
            raw_content: "# <Home>".into(),
            content: "<h1>&lt;Home&gt;</h1>".into(),
            timestamp: "Mon, 19 Oct 2026 10:00:00 +0000".into(),
        }
    }

    #[test]
    fn new_page_form_carries_sentinel_and_flag() {
        let html = page(true).render().unwrap();
        assert!(html.contains(r#"name="id" value="-1""#));
        assert!(html.contains(r#"name="newPage" value="yes""#));
        assert!(!html.contains(r#"action="/delete""#));
    }

    #[test]
    fn existing_page_form_carries_id_and_delete() {
        let html = page(false).render().unwrap();
        assert!(html.contains(r#"name="id" value="7""#));
        assert!(html.contains(r#"name="newPage" value="no""#));
        assert!(html.contains(r#"action="/delete""#));
    }

    #[test]
    fn raw_markdown_is_escaped_but_content_is_not() {
        let html = page(false).render().unwrap();
        let textarea = html
            .split(r#"<textarea name="markdown">"#)
            .nth(1)
            .and_then(|rest| rest.split("</textarea>").next())
            .unwrap();
        assert!(textarea.starts_with("# "));
        assert!(!textarea.contains("<Home>"));
        assert!(html.contains("<h1>&lt;Home&gt;</h1>"));
    }

    #[test]
    fn index_lists_every_page() {
        let html = IndexTemplate {
            title: "Wiki home".into(),
            pages: vec![PageLink::new("Alpha".into()), PageLink::new("Two Words".into())],
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"href="/wiki/Alpha""#));
        assert!(html.contains(r#"href="/wiki/Two%20Words""#));
    }

    #[test]
    fn wiki_path_escapes_reserved_characters() {
        assert_eq!(wiki_path("Foo"), "/wiki/Foo");
        assert_eq!(wiki_path("a/b c"), "/wiki/a%2Fb%20c");
    }

    #[test]
    fn empty_index_says_so() {
        let html = IndexTemplate { title: "Wiki home".into(), pages: vec![] }
            .render()
            .unwrap();
        assert!(html.contains("No pages yet"));
    }
}
