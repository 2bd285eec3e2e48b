//! Page index: which ids belong to which page, plus pagination metadata

use crate::core::item::ItemId;
use crate::core::page::{MetaUpdate, Page, PaginationMeta};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Page membership and the current page pointer for one search term
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    /// Map from page number to its ids
    pages: BTreeMap<u32, Page>,
    /// Aggregate metadata
    meta: PaginationMeta,
}

impl PageIndex {
    /// Create an uninitialized index
    pub fn new() -> Self {
        Self::default()
    }

    /// Current metadata
    pub fn meta(&self) -> PaginationMeta {
        self.meta
    }

    /// Record (or overwrite) the ids of a page
    pub fn set_page_membership(&mut self, number: u32, item_ids: Vec<ItemId>) {
        self.pages.insert(number, Page::new(number, item_ids));
    }

    /// Whether a page is cached. Always false while uninitialized.
    pub fn has_page(&self, number: u32) -> bool {
        self.meta.is_populated() && self.pages.contains_key(&number)
    }

    /// Whether `number` lies within `[1, last_page]`
    pub fn page_in_range(&self, number: u32) -> bool {
        self.meta.is_populated() && number >= 1 && number <= self.meta.last_page
    }

    /// Move the pointer to a cached page. Returns false and changes
    /// nothing when the page is not cached.
    pub fn select_current_page(&mut self, number: u32) -> bool {
        if !self.has_page(number) {
            return false;
        }
        self.meta = self.meta.merged(MetaUpdate::default().current_page(number));
        true
    }

    /// Merge pagination fields
    pub fn update_meta(&mut self, update: MetaUpdate) {
        self.meta = self.meta.merged(update);
    }

    /// Register a page against the current metadata.
    ///
    /// Empty pages are ignored (`Ok(false)`). Out-of-range pages fail with
    /// [`Error::OutOfRange`] and leave the index untouched.
    pub fn add_page(&mut self, number: u32, item_ids: Vec<ItemId>) -> Result<bool> {
        if item_ids.is_empty() {
            return Ok(false);
        }
        self.check_range(number)?;
        self.set_page_membership(number, item_ids);
        Ok(true)
    }

    /// Metadata update followed by page registration, as one unit.
    ///
    /// Used by the search that first establishes `last_page`: the range
    /// check runs against the merged metadata, and on failure neither the
    /// metadata nor the pages change.
    ///
    /// An empty page still updates the metadata. Any stale ids cached for
    /// that page are dropped, and every page goes once the total is zero.
    pub fn establish(
        &mut self,
        update: MetaUpdate,
        number: u32,
        item_ids: Vec<ItemId>,
    ) -> Result<bool> {
        if item_ids.is_empty() {
            self.update_meta(update);
            if self.meta.is_populated() {
                self.pages.remove(&number);
            } else {
                self.pages.clear();
            }
            return Ok(false);
        }
        let previous = self.meta;
        self.update_meta(update);
        match self.add_page(number, item_ids) {
            Ok(added) => Ok(added),
            Err(e) => {
                self.meta = previous;
                Err(e)
            }
        }
    }

    /// Fail with [`Error::OutOfRange`] unless `number` is in range
    pub fn check_range(&self, number: u32) -> Result<()> {
        if self.page_in_range(number) {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                page: number,
                last_page: self.meta.last_page,
            })
        }
    }

    /// Look up a cached page
    pub fn page(&self, number: u32) -> Option<&Page> {
        self.pages.get(&number).filter(|_| self.meta.is_populated())
    }

    /// The page the pointer is on, if cached
    pub fn current(&self) -> Option<&Page> {
        self.page(self.meta.current_page)
    }

    /// Cached page numbers in ascending order
    pub fn page_numbers(&self) -> Vec<u32> {
        if !self.meta.is_populated() {
            return Vec::new();
        }
        self.pages.keys().copied().collect()
    }

    /// Drop every page and reset metadata to zero
    pub fn clear_all_pages(&mut self) {
        self.pages.clear();
        self.meta = PaginationMeta::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<ItemId> {
        raw.iter().map(|id| ItemId::from(*id)).collect()
    }

    fn populated() -> PageIndex {
        let mut index = PageIndex::new();
        let update = MetaUpdate::default().per_page(2).total_items(7).current_page(1);
        index.establish(update, 1, ids(&["a", "b"])).unwrap();
        index
    }

    #[test]
    fn test_uninitialized_reports_nothing() {
        let mut index = PageIndex::new();
        index.set_page_membership(1, ids(&["a"]));

        assert!(!index.has_page(1));
        assert!(!index.page_in_range(1));
        assert!(!index.select_current_page(1));
        assert!(index.page_numbers().is_empty());
        assert_eq!(index.meta(), PaginationMeta::default());
    }

    #[test]
    fn test_establish_sets_meta_before_page() {
        let index = populated();
        let meta = index.meta();

        assert_eq!(meta.last_page, 4);
        assert_eq!(meta.current_page, 1);
        assert!(index.has_page(1));
        assert!(index.page_in_range(4));
        assert!(!index.page_in_range(5));
        assert!(!index.page_in_range(0));
    }

    #[test]
    fn test_add_page_out_of_range_leaves_state() {
        let mut index = populated();
        let before = index.meta();

        let err = index.add_page(5, ids(&["x"])).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { page: 5, last_page: 4 }));
        assert!(!index.has_page(5));
        assert_eq!(index.meta(), before);

        let mut empty = PageIndex::new();
        assert!(empty.add_page(1, ids(&["x"])).is_err());
        assert!(!empty.has_page(1));
    }

    #[test]
    fn test_add_empty_page_is_noop() {
        let mut index = populated();
        assert!(!index.add_page(2, Vec::new()).unwrap());
        assert!(!index.has_page(2));
        assert!(!index.add_page(99, Vec::new()).unwrap());
        assert!(!index.has_page(99));

    }

    #[test]
    fn test_establish_empty_page_still_updates_meta() {
        let mut index = populated();
        index.add_page(2, ids(&["c", "d"])).unwrap();

        let update = MetaUpdate::default().total_items(3).current_page(2);
        assert!(!index.establish(update, 2, Vec::new()).unwrap());
        assert_eq!(index.meta().total_items, 3);
        assert_eq!(index.meta().last_page, 2);
        assert!(!index.has_page(2));
        assert_eq!(index.page_numbers(), vec![1]);

        let update = MetaUpdate::default().total_items(0).current_page(1);
        assert!(!index.establish(update, 1, Vec::new()).unwrap());
        assert_eq!(index.meta().total_items, 0);
        assert!(index.page_numbers().is_empty());
        assert!(index.current().is_none());
    }

    #[test]
    fn test_add_page_keeps_current_page() {
        let mut index = populated();
        assert!(index.add_page(3, ids(&["e", "f"])).unwrap());
        assert_eq!(index.meta().current_page, 1);
        assert_eq!(index.page_numbers(), vec![1, 3]);
    }

    #[test]
    fn test_select_current_page() {
        let mut index = populated();
        index.add_page(2, ids(&["c", "d"])).unwrap();

        assert!(index.select_current_page(2));
        assert_eq!(index.meta().current_page, 2);
        assert_eq!(index.current().unwrap().item_ids, ids(&["c", "d"]));

        assert!(!index.select_current_page(3));
        assert_eq!(index.meta().current_page, 2);
    }

    #[test]
    fn test_failed_establish_rolls_back_meta() {
        let mut index = populated();
        let before = index.meta();

        let update = MetaUpdate::default().per_page(2).total_items(2).current_page(3);
        assert!(index.establish(update, 3, ids(&["z"])).is_err());
        assert_eq!(index.meta(), before);
    }

    #[test]
    fn test_clear_all_pages() {
        let mut index = populated();
        index.clear_all_pages();

        assert!(!index.has_page(1));
        assert_eq!(index.meta(), PaginationMeta::default());
    }
}
