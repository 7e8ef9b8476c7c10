//! Request planning: predicate compilation and sort strategy.

pub mod predicate_compiler;
pub mod sort_strategy;

pub use predicate_compiler::compile;
pub use sort_strategy::{RequestPlan, SortStrategy, classify, plan_request};
