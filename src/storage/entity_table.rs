//! Entity table: keyed item storage with idempotent upsert

use crate::core::item::{Item, ItemId};
use std::collections::HashMap;
use std::sync::Arc;

/// Keyed mapping from item id to item.
///
/// Upserts replace whole records; ids keep the position of their first
/// insertion so iteration order is stable across re-fetches.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    /// Map from item ID to the shared record
    entities: HashMap<ItemId, Arc<Item>>,
    /// Insertion order of ids
    order: Vec<ItemId>,
}

impl EntityTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge items by id. Returns the number of records that changed.
    pub fn upsert<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = Item>,
    {
        let mut changed = 0;
        for item in items {
            match self.entities.get(&item.id) {
                Some(existing) if **existing == item => {}
                Some(_) => {
                    self.entities.insert(item.id.clone(), Arc::new(item));
                    changed += 1;
                }
                None => {
                    self.order.push(item.id.clone());
                    self.entities.insert(item.id.clone(), Arc::new(item));
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Replace the whole table with `items`
    pub fn replace_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = Item>,
    {
        self.clear();
        self.upsert(items);
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
    }

    /// Look up one item
    pub fn get(&self, id: &ItemId) -> Option<Arc<Item>> {
        self.entities.get(id).cloned()
    }

    /// Resolve ids to items, skipping unknown ids
    pub fn get_many<'a>(&self, ids: impl IntoIterator<Item = &'a ItemId>) -> Vec<Arc<Item>> {
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    /// Every item in insertion order
    pub fn all(&self) -> Vec<Arc<Item>> {
        self.get_many(&self.order)
    }

    /// Every id in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.order.iter()
    }

    /// Check whether an id is present
    pub fn contains(&self, id: &ItemId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(id: &str, title: &str) -> Item {
        Item::new(id, title, "")
    }

    #[test]
    fn test_upsert_adds_and_replaces() {
        let mut table = EntityTable::new();
        assert_eq!(table.upsert(vec![item("1", "Alien"), item("2", "Aliens")]), 2);

        let changed = table.upsert(vec![
            item("2", "Aliens (Director's Cut)"),
            item("3", "Alien 3"),
        ]);
        assert_eq!(changed, 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(&"2".into()).unwrap().title, "Aliens (Director's Cut)");

        let ids: Vec<&str> = table.ids().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_upsert_unchanged_is_noop() {
        let mut table = EntityTable::new();
        table.upsert(vec![item("1", "Alien")]);
        let before = table.get(&"1".into()).unwrap();

        assert_eq!(table.upsert(vec![item("1", "Alien")]), 0);
        assert!(Arc::ptr_eq(&before, &table.get(&"1".into()).unwrap()));
    }

    #[test]
    fn test_replace_all_and_clear() {
        let mut table = EntityTable::new();
        table.upsert(vec![item("1", "Alien"), item("2", "Aliens")]);

        table.replace_all(vec![item("9", "Prometheus")]);
        assert_eq!(table.len(), 1);
        assert!(!table.contains(&"1".into()));

        table.clear();
        assert!(table.is_empty());
        assert!(table.all().is_empty());
    }

    proptest! {
        #[test]
        fn prop_upsert_keeps_union_with_latest_values(
            batches in prop::collection::vec(
                prop::collection::vec((0u8..16, "[a-z]{1,6}"), 0..8),
                0..8,
            )
        ) {
            let mut table = EntityTable::new();
            let mut expected: HashMap<String, String> = HashMap::new();

            for batch in batches {
                let items: Vec<Item> = batch
                    .iter()
                    .map(|(id, title)| item(&id.to_string(), title))
                    .collect();
                for (id, title) in &batch {
                    expected.insert(id.to_string(), title.clone());
                }
                table.upsert(items);
            }

            prop_assert_eq!(table.len(), expected.len());
            for (id, title) in &expected {
                let stored = table.get(&ItemId::new(id.clone()));
                prop_assert_eq!(stored.map(|i| i.title.clone()), Some(title.clone()));
            }
        }
    }
}
