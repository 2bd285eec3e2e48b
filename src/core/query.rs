//! Query criteria and shareable bookmarks

use crate::core::item::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Criteria driving the cache and the derived view.
///
/// `search_term` partitions the cache; `filter_text` and
/// `selected_category_ids` only shape the derived view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Remote search term (cache partition key)
    pub search_term: String,
    /// Local free-text filter
    pub filter_text: String,
    /// Categories the derived view is restricted to
    pub selected_category_ids: BTreeSet<CategoryId>,
}

/// The subset of store state worth sharing through URL parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Search term (`q`)
    pub search_term: String,
    /// Filter text (`filter`)
    pub filter_text: String,
    /// Page number (`page`), 0 when nothing was loaded
    pub current_page: u32,
}

impl Bookmark {
    /// Create a bookmark
    pub fn new(
        search_term: impl Into<String>,
        filter_text: impl Into<String>,
        current_page: u32,
    ) -> Self {
        Self {
            search_term: search_term.into(),
            filter_text: filter_text.into(),
            current_page,
        }
    }

    /// Page to seed a search with; pages start at 1
    pub fn seed_page(&self) -> u32 {
        self.current_page.max(1)
    }

    /// Encode as `q=..&filter=..&page=..`; empty fields are omitted
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if !self.search_term.is_empty() {
            params.push(format!("q={}", urlencoding::encode(&self.search_term)));
        }
        if !self.filter_text.is_empty() {
            params.push(format!("filter={}", urlencoding::encode(&self.filter_text)));
        }
        if self.current_page > 0 {
            params.push(format!("page={}", self.current_page));
        }
        params.join("&")
    }

    /// Decode a query string produced by [`Bookmark::to_query_string`].
    ///
    /// Unknown keys and malformed values are ignored; a leading `?` is accepted.
    pub fn from_query_string(query: &str) -> Self {
        let mut bookmark = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let raw = raw.replace('+', " ");
            let Ok(value) = urlencoding::decode(&raw) else {
                continue;
            };
            match key {
                "q" => bookmark.search_term = value.into_owned(),
                "filter" => bookmark.filter_text = value.into_owned(),
                "page" => bookmark.current_page = value.parse().unwrap_or(0),
                _ => {}
            }
        }
        bookmark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encoding() {
        let bookmark = Bookmark::new("star wars", "jedi & sith", 2);
        assert_eq!(bookmark.to_query_string(), "q=star%20wars&filter=jedi%20%26%20sith&page=2");
        assert_eq!(Bookmark::from_query_string(&bookmark.to_query_string()), bookmark);
    }

    #[test]
    fn test_query_string_lenient_decoding() {
        let bookmark = Bookmark::from_query_string("?q=dogs+and+cats&page=abc&sort=asc");
        assert_eq!(bookmark.search_term, "dogs and cats");
        assert_eq!(bookmark.current_page, 0);
        assert_eq!(bookmark.seed_page(), 1);
        assert!(bookmark.filter_text.is_empty());
    }

    #[test]
    fn test_empty_bookmark_encodes_to_nothing() {
        assert_eq!(Bookmark::default().to_query_string(), "");
        assert_eq!(Bookmark::from_query_string(""), Bookmark::default());
    }
}
