//! Facet dropdown values, loaded once and independent of the filter state.

use std::{collections::{BTreeMap, BTreeSet}, sync::Arc};

use common::search_result::{FacetChoice, FacetValue};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::store::CatalogStore;


pub type FacetSources = BTreeMap<String, Vec<FacetChoice>>;


pub struct FacetSourceCache {
    store: Arc<dyn CatalogStore>,
    facets: Vec<String>,
    loaded: OnceCell<FacetSources>,
}

impl FacetSourceCache {
    pub fn new(store: Arc<dyn CatalogStore>, facets: Vec<String>) -> Self {
        Self { store, facets, loaded: OnceCell::new() }
    }

    /// Loads every facet on first call; later calls return the same values.
    pub async fn load(&self) -> &FacetSources {
        self.loaded
            .get_or_init(|| async {
                let loads = self.facets.iter().map(|facet| load_facet_choices(self.store.as_ref(), facet));
                let choices = futures::future::join_all(loads).await;
                self.facets.iter().cloned().zip(choices).collect()
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }
}


/// `All` followed by the column's distinct values, sorted case-insensitively.
/// Falls back to deriving the values from raw rows when the store has no
/// distinct operation (or it fails); an empty list when both paths fail.
pub async fn load_facet_choices(store: &dyn CatalogStore, column: &str) -> Vec<FacetChoice> {
    let values = match store.distinct_values(column).await {
        Ok(Some(values)) => Some(values),
        Ok(None) => {
            info!(column, "store has no distinct values, deriving facet values from rows");
            None
        }
        Err(e) => {
            warn!(column, "distinct facet values failed, deriving from rows: {:#}", e);
            None
        }
    };
    let values = match values {
        Some(values) => values,
        None => match store.column_values(column).await {
            Ok(raw) => distinct_from_raw(raw),
            Err(e) => {
                warn!(column, "could not load facet values: {:#}", e);
                return Vec::new();
            }
        },
    };

    let mut values = values.into_iter().collect::<BTreeSet<_>>().into_iter().collect::<Vec<_>>();
    values.sort_by_key(|value| (value.display_string().to_lowercase(), value.clone()));

    let mut choices = Vec::with_capacity(values.len() + 1);
    choices.push(FacetChoice::All);
    choices.extend(values.into_iter().map(FacetChoice::Value));
    choices
}

fn distinct_from_raw(raw: Vec<Value>) -> Vec<FacetValue> {
    let mut values = BTreeSet::new();
    for value in raw {
        match value {
            Value::Array(items) => values.extend(items.iter().filter_map(FacetValue::from_json)),
            other => values.extend(FacetValue::from_json(&other)),
        }
    }
    values.into_iter().collect()
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use common::query_plan::QueryPlan;

    use super::*;
    use crate::{
        api::search::search_sql::{MAX_FACET_VALUES, facet_values_from_terms},
        store::{MemoryStore, StoreRows},
        test_fixtures::model_fixture,
    };

    fn values(choices: &[FacetChoice]) -> Vec<String> {
        choices
            .iter()
            .map(|c| match c {
                FacetChoice::All => "*".to_string(),
                FacetChoice::Value(v) => v.display_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn both_paths_produce_the_same_choices() {
        let optimized = MemoryStore::new(model_fixture());
        let fallback = MemoryStore::new(model_fixture()).without_distinct();
        for column in ["organization", "access_types", "tier"] {
            let a = load_facet_choices(&optimized, column).await;
            let b = load_facet_choices(&fallback, column).await;
            assert_eq!(a, b, "{column}");
            assert_eq!(a[0], FacetChoice::All);
        }
        let organizations = load_facet_choices(&fallback, "organization").await;
        assert_eq!(values(&organizations), vec!["*", "Meta", "Mistral", "OpenAI", "Stability", "TII"]);
    }

    #[tokio::test]
    async fn sorting_ignores_case() {
        let rows = ["beta", "Alpha", "alpha", "Gamma"]
            .into_iter()
            .map(|name| common::search_result::CatalogItem::from(serde_json::json!({ "organization": name })))
            .collect();
        let store = MemoryStore::new(rows).without_distinct();
        let choices = load_facet_choices(&store, "organization").await;
        assert_eq!(values(&choices), vec!["*", "Alpha", "alpha", "beta", "Gamma"]);
    }

    struct BrokenStore {
        column_calls: AtomicUsize,
        rows_work: bool,
    }

    #[async_trait]
    impl CatalogStore for BrokenStore {
        async fn fetch_rows(&self, _plan: &QueryPlan) -> anyhow::Result<StoreRows> {
            anyhow::bail!("offline")
        }

        async fn distinct_values(&self, _column: &str) -> anyhow::Result<Option<Vec<FacetValue>>> {
            anyhow::bail!("distinct failed")
        }

        async fn column_values(&self, _column: &str) -> anyhow::Result<Vec<Value>> {
            self.column_calls.fetch_add(1, Ordering::SeqCst);
            if self.rows_work {
                Ok(vec![serde_json::json!("b"), serde_json::json!(null), serde_json::json!(["a", "b"])])
            } else {
                anyhow::bail!("offline")
            }
        }
    }

    #[tokio::test]
    async fn failed_distinct_falls_back_to_rows() {
        let store = BrokenStore { column_calls: AtomicUsize::new(0), rows_work: true };
        let choices = load_facet_choices(&store, "tier").await;
        assert_eq!(values(&choices), vec!["*", "a", "b"]);
        assert_eq!(store.column_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn total_failure_is_an_empty_list() {
        let store = BrokenStore { column_calls: AtomicUsize::new(0), rows_work: false };
        assert!(load_facet_choices(&store, "tier").await.is_empty());
    }

    /// Answers distinct values the way the SQL store does, capped group list included.
    struct CappedStore(MemoryStore);

    #[async_trait]
    impl CatalogStore for CappedStore {
        async fn fetch_rows(&self, plan: &QueryPlan) -> anyhow::Result<StoreRows> {
            self.0.fetch_rows(plan).await
        }

        async fn distinct_values(&self, column: &str) -> anyhow::Result<Option<Vec<FacetValue>>> {
            let groups = self.0.distinct_values(column).await?.unwrap_or_default();
            let terms = groups
                .iter()
                .take(MAX_FACET_VALUES as usize + 1)
                .map(|value| Value::String(value.display_string()))
                .collect();
            facet_values_from_terms(terms)
        }

        async fn column_values(&self, column: &str) -> anyhow::Result<Vec<Value>> {
            self.0.column_values(column).await
        }
    }

    #[tokio::test]
    async fn column_past_the_distinct_cap_is_not_truncated() {
        let rows = (0..=MAX_FACET_VALUES)
            .map(|i| common::search_result::CatalogItem::from(serde_json::json!({ "organization": format!("org-{i:04}") })))
            .collect::<Vec<_>>();
        let capped = load_facet_choices(&CappedStore(MemoryStore::new(rows.clone())), "organization").await;
        let fallback = load_facet_choices(&MemoryStore::new(rows).without_distinct(), "organization").await;
        assert_eq!(capped.len(), MAX_FACET_VALUES as usize + 2);
        assert_eq!(capped, fallback);
    }

    #[tokio::test]
    async fn cache_loads_once() {
        let store = Arc::new(BrokenStore { column_calls: AtomicUsize::new(0), rows_work: true });
        let cache = FacetSourceCache::new(store.clone(), vec!["tier".into(), "organization".into()]);
        assert!(!cache.is_loaded());
        let first = cache.load().await.clone();
        let second = cache.load().await.clone();
        assert_eq!(first, second);
        assert!(cache.is_loaded());
        assert_eq!(first.keys().cloned().collect::<Vec<_>>(), vec!["organization", "tier"]);
        assert_eq!(store.column_calls.load(Ordering::SeqCst), 2);
    }
}
