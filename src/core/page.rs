//! Pages, pagination metadata and remote page payloads

use crate::core::item::{Item, ItemId};
use serde::{Deserialize, Serialize};

/// A numbered, ordered set of item ids produced by one fetch.
///
/// Pages are values: re-fetching a page replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: u32,
    /// Ids of the items on this page, in remote order
    pub item_ids: Vec<ItemId>,
}

impl Page {
    /// Create a page
    pub fn new(number: u32, item_ids: Vec<ItemId>) -> Self {
        Self { number, item_ids }
    }

    /// Number of items on the page
    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    /// Check if the page holds no items
    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

/// Aggregate pagination metadata.
///
/// Invariants: `current_page <= last_page` and
/// `last_page == ceil(total_items / per_page)` (0 when `per_page == 0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Page the consumer is looking at (0 when nothing is loaded)
    pub current_page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total items for the current search term
    pub total_items: u64,
    /// Last valid page number
    pub last_page: u32,
}

impl PaginationMeta {
    /// Apply a partial update and restore the invariants
    pub fn merged(self, update: MetaUpdate) -> Self {
        let mut meta = Self {
            current_page: update.current_page.unwrap_or(self.current_page),
            per_page: update.per_page.unwrap_or(self.per_page),
            total_items: update.total_items.unwrap_or(self.total_items),
            last_page: 0,
        };
        meta.last_page = last_page_for(meta.total_items, meta.per_page);
        meta.current_page = meta.current_page.min(meta.last_page);
        meta
    }

    /// Whether any results are known ("populated" vs "uninitialized")
    pub fn is_populated(&self) -> bool {
        self.total_items > 0
    }

    /// 0-based offset of the first item of the current page
    pub fn start(&self) -> u64 {
        if self.current_page == 0 {
            0
        } else {
            u64::from(self.current_page - 1) * u64::from(self.per_page)
        }
    }

    /// 0-based offset one past the last item of the current page
    pub fn end(&self) -> u64 {
        (self.start() + u64::from(self.per_page)).min(self.total_items)
    }
}

fn last_page_for(total_items: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Partial pagination update; `None` fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetaUpdate {
    /// New current page
    pub current_page: Option<u32>,
    /// New page size
    pub per_page: Option<u32>,
    /// New total item count
    pub total_items: Option<u64>,
}

impl MetaUpdate {
    /// Set the current page
    pub fn current_page(mut self, page: u32) -> Self {
        self.current_page = Some(page);
        self
    }

    /// Set the page size
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Set the total item count
    pub fn total_items(mut self, total: u64) -> Self {
        self.total_items = Some(total);
        self
    }
}

/// Pagination block returned by the remote catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePagination {
    /// Page the response belongs to
    pub current_page: u32,
    /// Page size used by the remote
    pub per_page: u32,
    /// Total matching results
    pub total_results: u64,
    /// Total pages as reported by the remote
    pub total_pages: u32,
}

/// One page of search results from the remote catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePage {
    /// Items on the page
    pub items: Vec<Item>,
    /// Pagination block
    pub pagination: RemotePagination,
}

impl RemotePage {
    /// Metadata update that establishes this page as the current one
    pub fn meta_update(&self, page: u32) -> MetaUpdate {
        MetaUpdate::default()
            .per_page(self.pagination.per_page)
            .total_items(self.pagination.total_results)
            .current_page(page)
    }

    /// Ids of the items on the page, in order
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}
