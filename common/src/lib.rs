//! Common library exports shared between the catalog engine and its callers.

extern crate serde;


pub mod filter_state;
pub mod query_plan;
pub mod search_result;
pub mod search_const;
pub mod url_param;
