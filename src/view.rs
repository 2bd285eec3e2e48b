//! Immutable snapshots handed to consumers

use crate::core::item::{Category, Item};
use crate::core::page::PaginationMeta;
use crate::core::query::{Bookmark, Query};
use crate::core::status::RequestStatus;
use crate::query::filter::AnnotatedItem;
use serde::Serialize;
use std::sync::Arc;

/// Pagination metadata with the item offsets of the current page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    /// Page the consumer is looking at (0 when nothing is loaded)
    pub current_page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total items for the search term
    pub total_items: u64,
    /// Last valid page
    pub last_page: u32,
    /// 0-based offset of the first item of the current page
    pub start: u64,
    /// 0-based offset one past the last item of the current page
    pub end: u64,
    /// Page numbers currently cached
    pub pages: Vec<u32>,
}

impl PaginationView {
    /// Build the view from metadata and the cached page numbers
    pub fn new(meta: PaginationMeta, pages: Vec<u32>) -> Self {
        Self {
            current_page: meta.current_page,
            per_page: meta.per_page,
            total_items: meta.total_items,
            last_page: meta.last_page,
            start: meta.start(),
            end: meta.end(),
            pages,
        }
    }
}

/// Fully composed store state.
///
/// A new value is built on every mutation; published snapshots are never
/// modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewModel {
    /// Search, filter and category criteria
    pub query: Query,
    /// Cached items of the current page, in page order
    pub items: Vec<Arc<Item>>,
    /// Filtered and highlighted view of `items`
    pub filtered: Vec<AnnotatedItem>,
    /// Pagination state
    pub pagination: PaginationView,
    /// Status of the primary search resource
    pub status: RequestStatus,
    /// Status of the category list
    pub categories_status: RequestStatus,
    /// Known categories
    pub categories: Vec<Arc<Category>>,
    /// Number of items cached across all pages
    pub cached_items: usize,
}

impl ViewModel {
    /// Whether the primary search is in flight
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Shareable subset of the state
    pub fn bookmark(&self) -> Bookmark {
        Bookmark::new(
            self.query.search_term.clone(),
            self.query.filter_text.clone(),
            self.pagination.current_page,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page::MetaUpdate;

    #[test]
    fn test_default_snapshot_is_empty() {
        let vm = ViewModel::default();
        assert!(vm.items.is_empty());
        assert!(vm.filtered.is_empty());
        assert_eq!(vm.pagination, PaginationView::default());
        assert_eq!(vm.status, RequestStatus::Idle);
        assert!(!vm.is_loading());
        assert_eq!(vm.bookmark().to_query_string(), "");
    }

    #[test]
    fn test_pagination_view_offsets() {
        let meta = PaginationMeta::default()
            .merged(MetaUpdate::default().per_page(20).total_items(50).current_page(3));
        let view = PaginationView::new(meta, vec![1, 2, 3]);

        assert_eq!(view.last_page, 3);
        assert_eq!(view.start, 40);
        assert_eq!(view.end, 50);
    }
}
