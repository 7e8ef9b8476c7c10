//! Catalog query and filter engine.
//!
//! Compiles a [`common::filter_state::FilterState`] into store predicates,
//! decides per sort key whether ordering and paging can be left to the store,
//! and keeps the visible result page consistent while the state changes.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod db_utils;
pub mod pager;
pub mod query;
pub mod store;

#[cfg(test)]
pub(crate) mod test_fixtures;
