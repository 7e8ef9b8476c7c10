//! SQL builder helpers for catalog query plans.

use common::{
    query_plan::{Predicate, QueryPlan},
    search_result::FacetValue,
};
use serde_json::Value;

pub const SQL_TIMEOUT_OPTIONS: &'static str = "agent_query_timeout=60000,max_query_time=60000";

/// Most distinct values read for one facet column. The GROUP BY query asks
/// for one more so a column past the cap can be detected.
pub const MAX_FACET_VALUES: u64 = 1000;


/// Column names come from filter state that may have been decoded from a URL,
/// so only plain (optionally dotted) identifiers are allowed through.
pub fn checked_identifier(name: &str) -> anyhow::Result<&str> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !valid_start || !valid_rest {
        anyhow::bail!("Invalid column name in catalog query: {:?}", name);
    }
    Ok(name)
}

fn sql_value(value: &FacetValue) -> String {
    match value {
        FacetValue::String(s) => format_sql_query::QuotedData(s).to_string(),
        FacetValue::Int(i) => i.to_string(),
    }
}

fn sql_values(values: &[FacetValue]) -> String {
    values.iter().map(sql_value).collect::<Vec<String>>().join(", ")
}

fn sql_number(n: f64) -> anyhow::Result<String> {
    if !n.is_finite() {
        anyhow::bail!("Invalid range bound in catalog query: {}", n);
    }
    Ok(n.to_string())
}

fn build_predicate_sql(predicate: &Predicate) -> anyhow::Result<String> {
    let sql = match predicate {
        Predicate::Equals { field, value } => {
            format!("{} = {}", checked_identifier(field)?, sql_value(value))
        }
        Predicate::OneOf { field, values } => {
            format!("{} IN ({})", checked_identifier(field)?, sql_values(values))
        }
        Predicate::ArrayContainsAny { field, values } => {
            format!("ANY({}) IN ({})", checked_identifier(field)?, sql_values(values))
        }
        Predicate::Range { field, min, max } => {
            let field = checked_identifier(field)?;
            let mut bounds = Vec::new();
            if let Some(min) = min {
                bounds.push(format!("{field} >= {}", sql_number(*min)?));
            }
            if let Some(max) = max {
                bounds.push(format!("{field} <= {}", sql_number(*max)?));
            }
            bounds.join(" AND ")
        }
        Predicate::TextMatchAny { fields, text } => {
            let fields = fields.iter().map(|f| checked_identifier(f)).collect::<anyhow::Result<Vec<_>>>()?;
            // quote @ so the text cannot open another field selector
            let text = text.trim().replace("@", "\\@");
            let expression = format!("@({}) {}", fields.join(","), text);
            format!("MATCH({})", format_sql_query::QuotedData(&expression))
        }
    };
    Ok(sql)
}

pub fn build_sql_where_clause(predicates: &[Predicate]) -> anyhow::Result<String> {
    let terms = predicates
        .iter()
        .map(build_predicate_sql)
        .collect::<anyhow::Result<Vec<_>>>()?
        .into_iter()
        .filter(|term| !term.is_empty())
        .collect::<Vec<_>>();
    if terms.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("WHERE {}", terms.join("\n        AND ")))
}

/// Row query for a plan. `row_limit` is the number of rows to read when the
/// plan has no page window (the whole filtered set).
pub fn build_select_sql(table: &str, plan: &QueryPlan, row_limit: u64) -> anyhow::Result<String> {
    let table = checked_identifier(table)?;
    let sql_where_clause = build_sql_where_clause(&plan.predicates)?;
    let order_clause = match &plan.order_by {
        Some(order) => format!(
            "ORDER BY {} {}",
            checked_identifier(&order.field)?,
            if order.ascending { "ASC" } else { "DESC" }
        ),
        None => String::new(),
    };
    let (limit, offset) = match plan.page_range {
        Some(range) => (range.len(), range.from),
        None => (row_limit, 0),
    };
    let max_matches = offset.saturating_add(limit).max(1);
    Ok(format!(
        "
    SELECT *
    FROM {table}
    {sql_where_clause}
    {order_clause}
    LIMIT {limit} OFFSET {offset}
    OPTION max_matches={max_matches},{SQL_TIMEOUT_OPTIONS}
    ;"
    ))
}

pub fn build_count_sql(table: &str, predicates: &[Predicate]) -> anyhow::Result<String> {
    let table = checked_identifier(table)?;
    let sql_where_clause = build_sql_where_clause(predicates)?;
    Ok(format!(
        "
    SELECT count(*) AS total_count
    FROM {table}
    {sql_where_clause}
    OPTION {SQL_TIMEOUT_OPTIONS}
    ;"
    ))
}

pub fn build_distinct_sql(table: &str, column: &str) -> anyhow::Result<String> {
    let table = checked_identifier(table)?;
    let column = checked_identifier(column)?;
    let limit = MAX_FACET_VALUES + 1;
    Ok(format!(
        "
    SELECT groupby() AS term, count(*) AS doc_count
    FROM {table}
    GROUP BY {column}
    LIMIT {limit}
    OPTION max_matches={limit},{SQL_TIMEOUT_OPTIONS}
    ;"
    ))
}

/// Facet values from the `term` column of a GROUP BY response. `Ok(None)`
/// when the column has more than `MAX_FACET_VALUES` values, so the caller
/// reads the full set from raw rows instead of showing a truncated one.
pub fn facet_values_from_terms(terms: Vec<Value>) -> anyhow::Result<Option<Vec<FacetValue>>> {
    if terms.len() as u64 > MAX_FACET_VALUES {
        return Ok(None);
    }
    let mut values = Vec::with_capacity(terms.len());
    for term in terms {
        match FacetValue::from_json(&term) {
            Some(value) => values.push(value),
            None => anyhow::bail!("Invalid value from store related to facets: {:#?}", term),
        }
    }
    Ok(Some(values))
}

pub fn build_column_sql(table: &str, column: &str, row_limit: u64) -> anyhow::Result<String> {
    let table = checked_identifier(table)?;
    let column = checked_identifier(column)?;
    let max_matches = row_limit.max(1);
    Ok(format!(
        "
    SELECT {column}
    FROM {table}
    LIMIT {row_limit}
    OPTION max_matches={max_matches},{SQL_TIMEOUT_OPTIONS}
    ;"
    ))
}
