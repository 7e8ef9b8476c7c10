//! Remote tabular store interface and its implementations.

use async_trait::async_trait;
use common::{query_plan::QueryPlan, search_result::{CatalogItem, FacetValue}};

mod memory_store;
pub use memory_store::MemoryStore;

mod sql_store;
pub use sql_store::SqlHttpStore;


/// Rows for one query plus the exact number of rows matching its predicates,
/// independent of the page window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreRows {
    pub rows: Vec<CatalogItem>,
    pub total_count: u64,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Runs the predicates (ANDed), applies `order_by` and `page_range` when present.
    async fn fetch_rows(&self, plan: &QueryPlan) -> anyhow::Result<StoreRows>;

    /// Distinct values of a column. `Ok(None)` means the store has no such
    /// operation and callers should derive the values from raw rows.
    async fn distinct_values(&self, _column: &str) -> anyhow::Result<Option<Vec<FacetValue>>> {
        Ok(None)
    }

    /// The raw value of one column for every row in the table.
    async fn column_values(&self, column: &str) -> anyhow::Result<Vec<serde_json::Value>>;
}
