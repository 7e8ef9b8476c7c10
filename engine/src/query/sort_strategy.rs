//! Decides whether a sort key can be ordered and paged by the store, or has
//! to be sorted in memory over the whole filtered set.

use std::cmp::Ordering;

use common::{
    filter_state::{FilterState, SortKey},
    query_plan::{QueryPlan, RemoteOrder},
    search_result::CatalogItem,
};
use serde_json::Value;

use crate::{config::CatalogSchema, pager::page_bounds, query::predicate_compiler::compile};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOrder {
    pub field: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortStrategy {
    /// The column is typed and indexed remotely: order and page there.
    RemotePageable(RemoteOrder),
    /// The column is stored inconsistently (text in some rows, numbers in
    /// others): fetch every matching row, coerce, sort and slice locally.
    LocalOnly(LocalOrder),
}

pub fn classify(sort_key: SortKey, schema: &CatalogSchema) -> SortStrategy {
    let remote = |field: &String, ascending: bool| {
        SortStrategy::RemotePageable(RemoteOrder { field: field.clone(), ascending })
    };
    let local = |descending: bool| {
        SortStrategy::LocalOnly(LocalOrder { field: schema.popularity_field.clone(), descending })
    };
    match sort_key {
        SortKey::NameAsc => remote(&schema.display_name_field, true),
        SortKey::NameDesc => remote(&schema.display_name_field, false),
        SortKey::Newest => remote(&schema.created_at_field, false),
        SortKey::Oldest => remote(&schema.created_at_field, true),
        SortKey::PopularityDesc => local(true),
        SortKey::PopularityAsc => local(false),
    }
}


/// Everything needed to run one fetch for a filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub query: QueryPlan,
    pub strategy: SortStrategy,
    pub page: u64,
    pub page_size: u64,
}

pub fn plan_request(state: &FilterState, schema: &CatalogSchema) -> RequestPlan {
    let state = state.normalized();
    let predicates = compile(&state, schema);
    let strategy = classify(state.sort_key, schema);
    let query = match &strategy {
        SortStrategy::RemotePageable(order) => QueryPlan {
            predicates,
            order_by: Some(order.clone()),
            page_range: Some(page_bounds(state.page, state.page_size)),
        },
        SortStrategy::LocalOnly(_) => QueryPlan { predicates, order_by: None, page_range: None },
    };
    RequestPlan { query, strategy, page: state.page, page_size: state.page_size }
}


/// Reads a number or a numeric string (optionally with `,` or `_`
/// separators). `None` for anything that is not a finite number.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().replace([',', '_'], "");
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Popularity-like columns may hold garbage; it counts as zero.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    value.and_then(parse_number).unwrap_or(0.0)
}

/// Stable sort, so rows with equal values keep the store's order.
pub fn sort_locally(items: &mut [CatalogItem], order: &LocalOrder) {
    items.sort_by(|a, b| {
        let a = coerce_number(a.field(&order.field));
        let b = coerce_number(b.field(&order.field));
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        if order.descending { ord.reverse() } else { ord }
    });
}
