//! Catalog search: result pages, facet sources and SQL rendering.

mod search_for_results;
pub use search_for_results::search_for_results;

mod search_facets;
pub use search_facets::{FacetSourceCache, FacetSources, load_facet_choices};

pub mod search_sql;

#[cfg(test)]
mod tests;
