//! Derived, annotated views over cached items.
//!
//! Nothing here mutates the cache: every call builds a new list of
//! [`AnnotatedItem`]s that borrow the cached records through `Arc`.

use crate::core::item::{CategoryId, Item};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Marker wrapped around every matched substring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Text inserted before a match
    pub open: String,
    /// Text inserted after a match
    pub close: String,
}

impl Highlight {
    /// Create a marker
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self::new("<span class='match'>", "</span>")
    }
}

/// Case-insensitive literal matcher for a filter text.
///
/// The text is escaped, so regex metacharacters match themselves. Texts
/// too long to compile within the regex size limit are matched by a
/// lowercase scan instead.
#[derive(Debug, Clone, Default)]
pub struct TextMatcher {
    text: String,
    pattern: Pattern,
}

#[derive(Debug, Clone, Default)]
enum Pattern {
    #[default]
    Any,
    Regex(Regex),
    Folded(Vec<char>),
}

impl TextMatcher {
    /// Build a matcher. Empty text matches everything.
    pub fn new(text: &str) -> Self {
        let pattern = if text.is_empty() {
            Pattern::Any
        } else {
            match RegexBuilder::new(&regex::escape(text))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Pattern::Regex(re),
                Err(e) => {
                    debug!(len = text.len(), error = %e, "filter falls back to a lowercase scan");
                    Pattern::Folded(text.chars().flat_map(char::to_lowercase).collect())
                }
            }
        };
        Self {
            text: text.to_string(),
            pattern,
        }
    }

    /// The raw filter text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether `haystack` contains the filter text
    pub fn is_match(&self, haystack: &str) -> bool {
        match &self.pattern {
            Pattern::Any => true,
            Pattern::Regex(re) => re.is_match(haystack),
            Pattern::Folded(needle) => !folded_spans(haystack, needle).is_empty(),
        }
    }

    /// Wrap every non-overlapping match in `highlight`; returns the
    /// annotated text and the number of matches
    pub fn annotate(&self, haystack: &str, highlight: &Highlight) -> (String, usize) {
        let spans = match &self.pattern {
            Pattern::Any => return (haystack.to_string(), 0),
            Pattern::Regex(re) => re.find_iter(haystack).map(|m| (m.start(), m.end())).collect(),
            Pattern::Folded(needle) => folded_spans(haystack, needle),
        };

        let mut out = String::with_capacity(haystack.len());
        let mut last = 0;
        for &(start, end) in &spans {
            out.push_str(&haystack[last..start]);
            out.push_str(&highlight.open);
            out.push_str(&haystack[start..end]);
            out.push_str(&highlight.close);
            last = end;
        }
        out.push_str(&haystack[last..]);
        (out, spans.len())
    }
}

/// Byte ranges of the non-overlapping occurrences of the lowercased
/// `needle` in `haystack`
fn folded_spans(haystack: &str, needle: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    while start < haystack.len() {
        match folded_match_len(&haystack[start..], needle) {
            Some(len) => {
                spans.push((start, start + len));
                start += len;
            }
            None => {
                start += haystack[start..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    spans
}

/// Length in bytes of the prefix of `rest` whose lowercase form is `needle`
fn folded_match_len(rest: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, ch) in rest.char_indices() {
        if matched == needle.len() {
            return Some(offset);
        }
        for lower in ch.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
    }
    (matched == needle.len()).then_some(rest.len())
}

/// An item that passed the filter, with highlighted text fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedItem {
    /// The cached record, untouched
    pub item: Arc<Item>,
    /// Title with matches wrapped in the highlight marker
    pub title: String,
    /// Description with matches wrapped in the highlight marker
    pub description: String,
    /// Matches found across title and description
    pub match_count: usize,
}

/// Compute the derived view of `items`.
///
/// An item passes when the filter text occurs in its title or
/// description (any item passes an empty filter) AND, if `categories` is
/// non-empty, it carries at least one of them. Items that fail are left
/// out; order is preserved.
pub fn compute_view(
    items: &[Arc<Item>],
    matcher: &TextMatcher,
    categories: Option<&BTreeSet<CategoryId>>,
    highlight: &Highlight,
) -> Vec<AnnotatedItem> {
    let categories = categories.filter(|set| !set.is_empty());

    items
        .iter()
        .filter(|item| matcher.is_match(&item.title) || matcher.is_match(&item.description))
        .filter(|item| categories.map_or(true, |set| item.has_any_category(set.iter())))
        .map(|item| {
            let (title, in_title) = matcher.annotate(&item.title, highlight);
            let (description, in_description) = matcher.annotate(&item.description, highlight);
            AnnotatedItem {
                item: Arc::clone(item),
                title,
                description,
                match_count: in_title + in_description,
            }
        })
        .collect()
}
