//! Page lookup result and the new-page sentinel.

use sqlx::FromRow;

/// Markdown shown for a page that has not been saved yet.
pub const EMPTY_PAGE_MARKDOWN: &str = "# A new page\n\nFeel free to write in Markdown!\n";

/// Id reported for a page that has no row in the store.
pub const NEW_PAGE_ID: i64 = -1;

/// The `(id, content)` pair returned by a page lookup.
///
/// A lookup that misses yields [`PageSource::new_page`] instead of an error so
/// the caller can offer the page as an editable blank.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PageSource {
    pub id: i64,
    pub content: String,
}

impl PageSource {
    /// The not-found sentinel: id `-1` with the placeholder markdown.
    pub fn new_page() -> Self {
        Self {
            id: NEW_PAGE_ID,
            content: EMPTY_PAGE_MARKDOWN.to_owned(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == NEW_PAGE_ID
    }
}
