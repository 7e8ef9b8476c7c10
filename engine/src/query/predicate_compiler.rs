//! Filter state to store predicates.

use common::{filter_state::FilterState, query_plan::Predicate};

use crate::config::CatalogSchema;


/// One predicate per populated entry, in a fixed order: text match, equality
/// facets, set-membership facets, then ranges (each map in key order).
/// Empty sets, open ranges and blank search text produce nothing.
pub fn compile(state: &FilterState, schema: &CatalogSchema) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    let text = state.search_text.trim();
    if !text.is_empty() && !schema.search_fields.is_empty() {
        predicates.push(Predicate::TextMatchAny {
            fields: schema.search_fields.clone(),
            text: text.to_string(),
        });
    }

    for (field, values) in state.equality_filters.iter() {
        let mut values = values.iter().cloned().collect::<Vec<_>>();
        match values.len() {
            0 => {}
            1 => predicates.push(Predicate::Equals { field: field.clone(), value: values.remove(0) }),
            _ => predicates.push(Predicate::OneOf { field: field.clone(), values }),
        }
    }

    for (field, values) in state.set_membership_filters.iter() {
        if values.is_empty() {
            continue;
        }
        predicates.push(Predicate::ArrayContainsAny {
            field: field.clone(),
            values: values.iter().cloned().collect(),
        });
    }

    // min > max is passed through; it simply matches no rows.
    for (field, bounds) in state.range_filters.iter() {
        if bounds.is_unbounded() {
            continue;
        }
        predicates.push(Predicate::Range { field: field.clone(), min: bounds.min, max: bounds.max });
    }

    predicates
}
