//! Remote query plans compiled from a filter state.

use serde::{Deserialize, Serialize};

use crate::search_result::FacetValue;


/// One atomic filter condition. A plan's predicates are ANDed together; the
/// values inside `OneOf` and `ArrayContainsAny` are ORed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Equals { field: String, value: FacetValue },
    OneOf { field: String, values: Vec<FacetValue> },
    ArrayContainsAny { field: String, values: Vec<FacetValue> },
    Range { field: String, min: Option<f64>, max: Option<f64> },
    TextMatchAny { fields: Vec<String>, text: String },
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub field: String,
    pub ascending: bool,
}

/// Half-open row window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub from: u64,
    pub to: u64,
}

impl PageRange {
    pub fn len(&self) -> u64 {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub order_by: Option<RemoteOrder>,
    pub page_range: Option<PageRange>,
}

impl QueryPlan {
    /// The same filter with no remote ordering and no row window, i.e. a
    /// request for the whole filtered set.
    pub fn unbounded(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            order_by: None,
            page_range: None,
        }
    }
}
