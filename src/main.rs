//! Catalog-Store: Main entry point

use anyhow::Context;
use catalog_store::cli::{Cli, Commands};
use catalog_store::config::StoreConfig;
use catalog_store::core::{Bookmark, CategoryId};
use catalog_store::storage::InMemoryCatalog;
use catalog_store::store::CatalogStore;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => StoreConfig::from_env()?,
    };

    let store = match cli.command {
        Commands::Search {
            catalog,
            term,
            page,
            filter,
            categories,
        } => {
            let store = open_store(&catalog, config)?;
            if let Some(filter) = filter {
                store.update_filter(&filter);
            }
            store.load_categories().await?;
            store.search(&term, page).await?;
            if !categories.is_empty() {
                store.select_categories(categories.into_iter().map(CategoryId::new), true);
            }
            store
        }
        Commands::Bookmark { catalog, query } => {
            let store = open_store(&catalog, config)?;
            store.load_categories().await?;
            store.restore(&Bookmark::from_query_string(&query)).await?;
            store
        }
    };

    store.settle().await;
    println!("{}", serde_json::to_string_pretty(&*store.snapshot())?);
    Ok(())
}

fn open_store(catalog: &Path, config: StoreConfig) -> anyhow::Result<CatalogStore> {
    let source = InMemoryCatalog::from_json_file(catalog)
        .with_context(|| format!("loading catalog from {}", catalog.display()))?;
    Ok(CatalogStore::with_config(Arc::new(source), config))
}
