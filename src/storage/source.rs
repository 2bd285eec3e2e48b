//! Remote catalog access.
//!
//! The store never talks to a transport directly; it goes through a
//! [`CatalogSource`], which may be an HTTP client, a fixture or a mock.

use crate::core::item::{Category, Item};
use crate::core::page::{RemotePage, RemotePagination};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Data-fetch capability of the remote catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of results for `query`. Pages start at 1.
    async fn search(&self, query: &str, page: u32) -> Result<RemotePage>;

    /// Fetch the full category list
    async fn load_categories(&self) -> Result<Vec<Category>>;
}

/// Catalog served from memory, mainly for fixtures and the CLI.
///
/// Searches are case-insensitive substring matches over title and
/// description. `per_page` is always at least 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "CatalogFile")]
pub struct InMemoryCatalog {
    items: Vec<Item>,
    categories: Vec<Category>,
    per_page: u32,
}

/// On-disk shape of an [`InMemoryCatalog`]
#[derive(Deserialize)]
struct CatalogFile {
    items: Vec<Item>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

impl TryFrom<CatalogFile> for InMemoryCatalog {
    type Error = Error;

    fn try_from(file: CatalogFile) -> Result<Self> {
        if file.per_page == 0 {
            return Err(Error::Configuration("per_page must be at least 1".to_string()));
        }
        Ok(Self {
            items: file.items,
            categories: file.categories,
            per_page: file.per_page,
        })
    }
}

fn default_per_page() -> u32 {
    20
}

impl InMemoryCatalog {
    /// Create a catalog with the default page size
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            categories: Vec::new(),
            per_page: default_per_page(),
        }
    }

    /// Set the page size (at least 1)
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Set the category list
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Load `{ "items": [...], "categories": [...], "per_page": n }` from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        Self::try_from(file)
    }

    fn matching(&self, query: &str) -> Vec<&Item> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.title.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn search(&self, query: &str, page: u32) -> Result<RemotePage> {
        if page == 0 {
            return Err(Error::Fetch("page numbers start at 1".to_string()));
        }

        let matches = self.matching(query);
        let per_page = self.per_page.max(1) as usize;
        let total = matches.len();
        let total_pages = total.div_ceil(per_page);
        let start = (page as usize - 1).saturating_mul(per_page);

        let items = matches
            .into_iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();

        Ok(RemotePage {
            items,
            pagination: RemotePagination {
                current_page: page,
                per_page: self.per_page,
                total_results: total as u64,
                total_pages: total_pages as u32,
            },
        })
    }

    async fn load_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            Item::new("1", "Good Dog", "A loyal friend"),
            Item::new("2", "Cat", "dog-like behaviour"),
            Item::new("3", "Snakes on a Plane", "Turbulence"),
            Item::new("4", "Dogville", "A small town"),
        ])
        .with_per_page(2)
    }

    #[tokio::test]
    async fn test_search_pages_matches() {
        let catalog = catalog();

        let first = catalog.search("DOG", 1).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.pagination.total_results, 3);
        assert_eq!(first.pagination.total_pages, 2);

        let second = catalog.search("dog", 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id.as_str(), "4");

        let beyond = catalog.search("dog", 3).await.unwrap();
        assert!(beyond.items.is_empty());
    }

    #[tokio::test]
    async fn test_page_zero_is_rejected() {
        assert!(matches!(catalog().search("dog", 0).await, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "items": [{{"id": "1", "title": "Heat", "overview": "Crime", "genre_ids": ["80"]}}],
                "categories": [{{"id": "80", "name": "Crime"}}],
                "per_page": 5
            }}"#
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_json_file(file.path()).unwrap();
        let page = catalog.search("heat", 1).await.unwrap();
        assert_eq!(page.pagination.per_page, 5);
        assert_eq!(page.items[0].category_ids[0].as_str(), "80");
        assert_eq!(catalog.load_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        let raw = r#"{"items": [{"id": "1", "title": "Heat"}], "per_page": 0}"#;
        let err = serde_json::from_str::<InMemoryCatalog>(raw).unwrap_err();
        assert!(err.to_string().contains("per_page must be at least 1"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{raw}").unwrap();
        let err = InMemoryCatalog::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let catalog: InMemoryCatalog = serde_json::from_str(r#"{"items": []}"#).unwrap();
        let page = catalog.search("heat", 1).await.unwrap();
        assert_eq!(page.pagination.per_page, 20);
        assert_eq!(page.pagination.total_pages, 0);
    }
}
