//! Catalog-Store: paginated, filterable entity cache for remote catalogs
//!
//! A single-writer store that caches pages of search results from a remote
//! catalog and publishes immutable view-model snapshots to its consumers.
//!
//! # Core Concepts
//!
//! - **Partition key**: the search term; changing it clears the whole cache
//! - **Pages**: numbered, ordered id lists recorded per successful fetch
//! - **Derived view**: filtered and highlighted items, recomputed on every change
//! - **Prefetch**: background fetch of the next page that never touches status
//!
//! # Example
//!
//! ```no_run
//! use catalog_store::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> catalog_store::error::Result<()> {
//! let catalog = InMemoryCatalog::new(vec![Item::new("1", "Good Dog", "A loyal friend")]);
//! let store = CatalogStore::new(Arc::new(catalog));
//!
//! store.search("dog", 1).await?;
//! store.update_filter("loyal");
//!
//! let vm = store.snapshot();
//! assert_eq!(vm.filtered.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod index;
pub mod query;
pub mod storage;
pub mod view;

/// Store implementation
pub mod store;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::StoreConfig;
    pub use crate::core::*;
    pub use crate::error::{Error, Result};
    pub use crate::query::{AnnotatedItem, Highlight};
    pub use crate::storage::{CatalogSource, InMemoryCatalog};
    pub use crate::store::{CatalogStore, SearchOutcome};
    pub use crate::view::{PaginationView, ViewModel};
}
