//! Store configuration

use crate::error::{Error, Result};
use crate::query::filter::Highlight;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Runtime settings of a [`crate::store::CatalogStore`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Status resource name of the primary search
    pub results_resource: String,
    /// Status resource name of the category list
    pub categories_resource: String,
    /// Prefetch the page after the one just loaded
    pub prefetch: bool,
    /// Text inserted before a filter match
    pub highlight_open: String,
    /// Text inserted after a filter match
    pub highlight_close: String,
    /// Term searched by `start()` when no bookmark is given
    pub initial_search_term: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let highlight = Highlight::default();
        Self {
            results_resource: "movies".to_string(),
            categories_resource: "genres".to_string(),
            prefetch: true,
            highlight_open: highlight.open,
            highlight_close: highlight.close,
            initial_search_term: "dogs".to_string(),
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `CATALOG_STORE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load a JSON document; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup("CATALOG_STORE_RESULTS_RESOURCE") {
            config.results_resource = value;
        }
        if let Some(value) = lookup("CATALOG_STORE_CATEGORIES_RESOURCE") {
            config.categories_resource = value;
        }
        if let Some(value) = lookup("CATALOG_STORE_PREFETCH") {
            config.prefetch = value.parse().map_err(|_| {
                Error::Configuration(format!(
                    "CATALOG_STORE_PREFETCH must be true or false, got '{value}'"
                ))
            })?;
        }
        if let Some(value) = lookup("CATALOG_STORE_HIGHLIGHT_OPEN") {
            config.highlight_open = value;
        }
        if let Some(value) = lookup("CATALOG_STORE_HIGHLIGHT_CLOSE") {
            config.highlight_close = value;
        }
        if let Some(value) = lookup("CATALOG_STORE_INITIAL_SEARCH") {
            config.initial_search_term = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Resource names must be non-empty and distinct
    pub fn validate(&self) -> Result<()> {
        if self.results_resource.is_empty() || self.categories_resource.is_empty() {
            return Err(Error::Configuration("resource names must not be empty".to_string()));
        }
        if self.results_resource == self.categories_resource {
            return Err(Error::Configuration(format!(
                "results and categories share the resource name '{}'",
                self.results_resource
            )));
        }
        Ok(())
    }

    /// Highlight marker built from the configured strings
    pub fn highlight(&self) -> Highlight {
        Highlight::new(self.highlight_open.clone(), self.highlight_close.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.results_resource, "movies");
        assert!(config.prefetch);
        assert_eq!(config.highlight(), Highlight::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("CATALOG_STORE_PREFETCH", "false"),
            ("CATALOG_STORE_HIGHLIGHT_OPEN", "<b>"),
            ("CATALOG_STORE_HIGHLIGHT_CLOSE", "</b>"),
            ("CATALOG_STORE_INITIAL_SEARCH", "cats"),
        ]))
        .unwrap();

        assert!(!config.prefetch);
        assert_eq!(config.highlight(), Highlight::new("<b>", "</b>"));
        assert_eq!(config.initial_search_term, "cats");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[("CATALOG_STORE_PREFETCH", "sometimes")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let clash = lookup(&[("CATALOG_STORE_CATEGORIES_RESOURCE", "movies")]);
        let err = StoreConfig::from_lookup(clash).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_from_json_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "prefetch": false, "results_resource": "shows" }}"#).unwrap();

        let config = StoreConfig::from_json_file(file.path()).unwrap();
        assert!(!config.prefetch);
        assert_eq!(config.results_resource, "shows");
        assert_eq!(config.categories_resource, "genres");
    }
}
