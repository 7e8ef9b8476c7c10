//! Catalog store backed by a SQL-over-HTTP search server.

use async_trait::async_trait;
use common::{query_plan::{Predicate, QueryPlan}, search_result::{CatalogItem, FacetValue}};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    api::search::search_sql::{
        build_column_sql, build_count_sql, build_distinct_sql, build_select_sql, facet_values_from_terms,
    },
    config::EngineConfig,
    db_utils::sql_http_utils::sql_http_query,
    store::{CatalogStore, StoreRows},
};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CountResponse {
    total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DistinctResponse {
    term: Value,
}


#[derive(Debug, Clone)]
pub struct SqlHttpStore {
    client: reqwest::Client,
    base_url: String,
    table: String,
}

impl SqlHttpStore {
    pub fn new(base_url: impl Into<String>, table: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), table: table.into() }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.store_url.clone(), config.table.clone())
    }

    async fn count(&self, predicates: &[Predicate]) -> anyhow::Result<u64> {
        let sql = build_count_sql(&self.table, predicates)?;
        let response = sql_http_query::<CountResponse>(&self.client, &self.base_url, sql).await?;
        Ok(response.hits.hits.first().map(|hit| hit._source.total_count).unwrap_or(0))
    }
}

#[async_trait]
impl CatalogStore for SqlHttpStore {
    async fn fetch_rows(&self, plan: &QueryPlan) -> anyhow::Result<StoreRows> {
        let total_count = self.count(&plan.predicates).await?;
        let window_is_empty = match plan.page_range {
            Some(range) => range.is_empty() || range.from >= total_count,
            None => total_count == 0,
        };
        if window_is_empty {
            debug!(total_count, "catalog window is empty, skipping row query");
            return Ok(StoreRows { rows: Vec::new(), total_count });
        }

        let sql = build_select_sql(&self.table, plan, total_count)?;
        let response = sql_http_query::<Value>(&self.client, &self.base_url, sql).await?;
        let rows = response.hits.hits.into_iter().map(|hit| CatalogItem::from(hit._source)).collect();
        Ok(StoreRows { rows, total_count })
    }

    async fn distinct_values(&self, column: &str) -> anyhow::Result<Option<Vec<FacetValue>>> {
        let sql = build_distinct_sql(&self.table, column)?;
        let response = sql_http_query::<DistinctResponse>(&self.client, &self.base_url, sql).await?;
        let terms = response.hits.hits.into_iter().map(|hit| hit._source.term).collect();
        let values = facet_values_from_terms(terms)?;
        if values.is_none() {
            info!(column, "too many distinct facet values, reading raw rows instead");
        }
        Ok(values)
    }

    async fn column_values(&self, column: &str) -> anyhow::Result<Vec<Value>> {
        let total_count = self.count(&[]).await?;
        let sql = build_column_sql(&self.table, column, total_count)?;
        let response = sql_http_query::<Value>(&self.client, &self.base_url, sql).await?;
        Ok(response
            .hits
            .hits
            .into_iter()
            .map(|hit| hit._source.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }
}
