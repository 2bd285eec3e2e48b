//! Selection of 0..n ids, independent of pagination

use std::collections::BTreeSet;

/// Set of selected ids.
///
/// The universe of selectable ids is supplied by the caller, so a
/// selection may span every known entity rather than one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet<K: Ord + Clone> {
    selected: BTreeSet<K>,
}

impl<K: Ord + Clone> Default for SelectionSet<K> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> SelectionSet<K> {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with `ids` (`clear_others`) or union them in
    pub fn select<I>(&mut self, ids: I, clear_others: bool)
    where
        I: IntoIterator<Item = K>,
    {
        if clear_others {
            self.selected.clear();
        }
        self.selected.extend(ids);
    }

    /// Select every id of `universe`, or clear when `flag` is false
    pub fn select_all<I>(&mut self, universe: I, flag: bool)
    where
        I: IntoIterator<Item = K>,
    {
        self.selected.clear();
        if flag {
            self.selected.extend(universe);
        }
    }

    /// Drop the selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Whether `id` is selected
    pub fn is_selected(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> &BTreeSet<K> {
        &self.selected
    }

    /// Number of selected ids
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_select_replace_then_clear() {
        let mut selection = SelectionSet::new();
        selection.select(["28", "12"], true);
        assert_eq!(selection.len(), 2);

        selection.select([], true);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_union_collapses_duplicates() {
        let mut selection = SelectionSet::new();
        selection.select(["28", "12"], false);
        selection.select(["12", "35"], false);

        let ids: Vec<&str> = selection.ids().iter().copied().collect();
        assert_eq!(ids, vec!["12", "28", "35"]);
    }

    #[test]
    fn test_select_all() {
        let mut selection = SelectionSet::new();
        selection.select(["stale"], false);

        selection.select_all(["a", "b", "c"], true);
        assert_eq!(selection.len(), 3);
        assert!(!selection.is_selected(&"stale"));

        selection.select_all(["a", "b", "c"], false);
        assert!(selection.is_empty());

        selection.select_all(std::iter::empty(), true);
        assert!(selection.is_empty());
    }

    proptest! {
        #[test]
        fn prop_union_of_two_selections(
            a in prop::collection::vec(0u16..50, 0..20),
            b in prop::collection::vec(0u16..50, 0..20),
        ) {
            let mut selection = SelectionSet::new();
            selection.select(a.clone(), false);
            selection.select(b.clone(), false);

            let expected: BTreeSet<u16> = a.into_iter().chain(b).collect();
            prop_assert_eq!(selection.ids(), &expected);
        }
    }
}
