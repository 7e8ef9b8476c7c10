//! In-process catalog store that evaluates query plans over a row vector.

use std::{cmp::Ordering, collections::BTreeSet};

use async_trait::async_trait;
use common::{
    query_plan::{Predicate, QueryPlan, RemoteOrder},
    search_result::{CatalogItem, FacetValue},
};
use serde_json::Value;

use crate::{
    query::sort_strategy::parse_number,
    store::{CatalogStore, StoreRows},
};


#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<CatalogItem>,
    supports_distinct: bool,
}

impl MemoryStore {
    pub fn new(rows: Vec<CatalogItem>) -> Self {
        Self { rows, supports_distinct: true }
    }

    /// Behave like a backend without a distinct-values operation.
    pub fn without_distinct(mut self) -> Self {
        self.supports_distinct = false;
        self
    }

    pub fn filter(&self, predicates: &[Predicate]) -> Vec<CatalogItem> {
        self.rows
            .iter()
            .filter(|row| predicates.iter().all(|p| row_matches(row, p)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn fetch_rows(&self, plan: &QueryPlan) -> anyhow::Result<StoreRows> {
        let mut rows = self.filter(&plan.predicates);
        let total_count = rows.len() as u64;
        if let Some(order) = &plan.order_by {
            rows.sort_by(|a, b| compare_rows(a, b, order));
        }
        if let Some(range) = plan.page_range {
            let from = usize::try_from(range.from).unwrap_or(usize::MAX);
            let len = usize::try_from(range.len()).unwrap_or(usize::MAX);
            rows = rows.into_iter().skip(from).take(len).collect();
        }
        Ok(StoreRows { rows, total_count })
    }

    async fn distinct_values(&self, column: &str) -> anyhow::Result<Option<Vec<FacetValue>>> {
        if !self.supports_distinct {
            return Ok(None);
        }
        let mut values = BTreeSet::new();
        for row in &self.rows {
            match row.field(column) {
                Some(Value::Array(items)) => values.extend(items.iter().filter_map(FacetValue::from_json)),
                Some(value) => values.extend(FacetValue::from_json(value)),
                None => {}
            }
        }
        Ok(Some(values.into_iter().collect()))
    }

    async fn column_values(&self, column: &str) -> anyhow::Result<Vec<Value>> {
        Ok(self.rows.iter().map(|row| row.field(column).cloned().unwrap_or(Value::Null)).collect())
    }
}


pub fn row_matches(row: &CatalogItem, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { field, value } => row.field(field).is_some_and(|v| value.matches_json(v)),
        Predicate::OneOf { field, values } => {
            row.field(field).is_some_and(|v| values.iter().any(|value| value.matches_json(v)))
        }
        Predicate::ArrayContainsAny { field, values } => match row.field(field) {
            Some(Value::Array(items)) => items.iter().any(|item| values.iter().any(|value| value.matches_json(item))),
            _ => false,
        },
        Predicate::Range { field, min, max } => {
            let Some(n) = row.field(field).and_then(parse_number) else {
                return false;
            };
            min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
        }
        Predicate::TextMatchAny { fields, text } => {
            let needle = text.to_lowercase();
            fields.iter().any(|field| match row.field(field) {
                Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                _ => false,
            })
        }
    }
}

/// Column ordering the way a typed store would do it: numbers before text,
/// text case-insensitively, missing values last in either direction.
fn compare_rows(a: &CatalogItem, b: &CatalogItem, order: &RemoteOrder) -> Ordering {
    let (a, b) = (a.field(&order.field), b.field(&order.field));
    let present = |v: Option<&Value>| v.is_some_and(|v| !v.is_null());
    match (present(a), present(b)) {
        (false, false) => return Ordering::Equal,
        (false, true) => return Ordering::Greater,
        (true, false) => return Ordering::Less,
        (true, true) => {}
    }
    let ord = match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            x.to_lowercase().cmp(&y.to_lowercase()).then_with(|| x.cmp(y))
        }
        (Some(Value::Number(_)), _) => Ordering::Less,
        (_, Some(Value::Number(_))) => Ordering::Greater,
        _ => Ordering::Equal,
    };
    if order.ascending { ord } else { ord.reverse() }
}
