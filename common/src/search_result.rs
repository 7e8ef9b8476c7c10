//! Catalog items, facet values and result pages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};


/// A single row of the catalog. Only a handful of columns are interpreted by
/// the engine; everything else passes through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CatalogItem(pub Map<String, Value>);

impl CatalogItem {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String view of a column, for identifiers and display names.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for CatalogItem {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => CatalogItem(map),
            _ => CatalogItem::default(),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<CatalogItem>,
    pub total_count: u64,
    pub page: u64,
}

impl ResultPage {
    pub fn empty(page: u64) -> Self {
        Self { items: Vec::new(), total_count: 0, page }
    }
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub enum FacetValue {
    String(String),
    Int(u64),
}

impl FacetValue {
    pub fn display_string(&self) -> String {
        match self {
            FacetValue::String(s) => s.clone(),
            FacetValue::Int(i) => i.to_string(),
        }
    }

    /// Interprets a raw column value as a facet value. Arrays and objects are
    /// not facet values themselves.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FacetValue::String(s.clone())),
            Value::Number(n) => n.as_u64().map(FacetValue::Int),
            _ => None,
        }
    }

    pub fn matches_json(&self, value: &Value) -> bool {
        match (self, value) {
            (FacetValue::String(s), Value::String(v)) => s == v,
            (FacetValue::Int(i), Value::Number(n)) => n.as_u64() == Some(*i),
            _ => false,
        }
    }
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        FacetValue::String(value.to_string())
    }
}

impl From<u64> for FacetValue {
    fn from(value: u64) -> Self {
        FacetValue::Int(value)
    }
}


/// One option in a facet dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacetChoice {
    All,
    Value(FacetValue),
}
