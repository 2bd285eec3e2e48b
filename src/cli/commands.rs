//! CLI commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Catalog-Store CLI
#[derive(Parser, Debug)]
#[command(name = "catalog-store")]
#[command(about = "Search a catalog through the caching store and print the view model")]
pub struct Cli {
    /// Store configuration file (JSON); defaults come from CATALOG_STORE_* variables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a search and print the resulting snapshot
    Search {
        /// Catalog file (JSON with `items`, `categories`, `per_page`)
        #[arg(short, long)]
        catalog: PathBuf,
        /// Search term
        #[arg(short, long)]
        term: String,
        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Local filter text
        #[arg(short, long)]
        filter: Option<String>,
        /// Restrict the view to these category ids
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Restore a bookmark query string and print the resulting snapshot
    Bookmark {
        /// Catalog file (JSON with `items`, `categories`, `per_page`)
        #[arg(short, long)]
        catalog: PathBuf,
        /// Query string, e.g. `q=dogs&filter=war&page=2`
        #[arg(short, long)]
        query: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from([
            "catalog-store",
            "search",
            "--catalog",
            "movies.json",
            "--term",
            "dogs",
            "--page",
            "2",
            "--category",
            "28",
            "--category",
            "80",
        ]);

        match cli.command {
            Commands::Search { term, page, categories, filter, .. } => {
                assert_eq!(term, "dogs");
                assert_eq!(page, 2);
                assert_eq!(categories, vec!["28", "80"]);
                assert!(filter.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_bookmark_with_config() {
        let cli = Cli::parse_from([
            "catalog-store",
            "bookmark",
            "-c",
            "movies.json",
            "-q",
            "q=dogs&page=3",
            "--config",
            "store.json",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("store.json")));
        assert!(matches!(cli.command, Commands::Bookmark { .. }));
    }
}
