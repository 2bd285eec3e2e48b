//! Catalog items and categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a catalog item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Stable identifier of a category (genre, tag, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A record fetched from the remote catalog.
///
/// Once upserted the item is owned by the entity table and handed out
/// behind an `Arc`; consumers only ever see shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier
    pub id: ItemId,
    /// Searchable title
    pub title: String,
    /// Searchable free text (`overview` in movie catalogs)
    #[serde(alias = "overview", default)]
    pub description: String,
    /// Optional artwork path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Category tags (`genre_ids` in movie catalogs)
    #[serde(alias = "genre_ids", default)]
    pub category_ids: Vec<CategoryId>,
}

impl Item {
    /// Create an untagged item
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            title: title.into(),
            description: description.into(),
            poster_path: None,
            category_ids: Vec::new(),
        }
    }

    /// Set category tags
    pub fn with_categories<I, C>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CategoryId>,
    {
        self.category_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the artwork path
    pub fn with_poster(mut self, path: impl Into<String>) -> Self {
        self.poster_path = Some(path.into());
        self
    }

    /// Whether the item carries at least one of the given categories
    pub fn has_any_category<'a>(&self, mut ids: impl Iterator<Item = &'a CategoryId>) -> bool {
        ids.any(|id| self.category_ids.contains(id))
    }
}

/// A named category known to the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
}

impl Category {
    /// Create a category
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.into(),
        }
    }
}
