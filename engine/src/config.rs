//! Engine configuration read from the environment.

use std::time::Duration;

use common::search_const::{DEBOUNCE_MS, PAGE_SIZE};


/// Column names of the catalog table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSchema {
    pub identifier_field: String,
    pub display_name_field: String,
    pub search_fields: Vec<String>,
    pub popularity_field: String,
    pub created_at_field: String,
    pub equality_facets: Vec<String>,
    pub membership_facets: Vec<String>,
    pub range_fields: Vec<String>,
}

impl Default for CatalogSchema {
    fn default() -> Self {
        Self {
            identifier_field: "id".to_string(),
            display_name_field: "name".to_string(),
            search_fields: vec!["name".to_string(), "description".to_string()],
            popularity_field: "stars".to_string(),
            created_at_field: "created_at".to_string(),
            equality_facets: vec!["category".to_string(), "organization".to_string(), "tier".to_string()],
            membership_facets: vec!["access_types".to_string()],
            range_fields: vec!["downloads".to_string(), "likes".to_string(), "parameters".to_string()],
        }
    }
}

impl CatalogSchema {
    /// Every facet whose distinct values feed the filter dropdowns.
    pub fn facet_columns(&self) -> Vec<String> {
        self.equality_facets.iter().chain(self.membership_facets.iter()).cloned().collect()
    }
}


#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub store_url: String,
    pub table: String,
    pub page_size: u64,
    pub debounce: Duration,
    pub schema: CatalogSchema,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_url: "http://127.0.0.1:9308".to_string(),
            table: "catalog_items".to_string(),
            page_size: PAGE_SIZE,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            schema: CatalogSchema::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let page_size = lookup("CATALOG_PAGE_SIZE")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.page_size);
        let debounce = lookup("CATALOG_DEBOUNCE_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);
        Self {
            store_url: lookup("CATALOG_STORE_URL").unwrap_or(defaults.store_url),
            table: lookup("CATALOG_TABLE").unwrap_or(defaults.table),
            page_size,
            debounce,
            schema: defaults.schema,
        }
    }
}
