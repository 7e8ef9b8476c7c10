//! Page boundaries and page resolution for both fetch strategies.

use common::{query_plan::PageRange, search_result::{CatalogItem, ResultPage}};


/// Where the rows of a page come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    /// The store already returned the requested window and the full count.
    Remote { items: Vec<CatalogItem>, total_count: u64 },
    /// The whole filtered set, already in display order.
    Materialized(Vec<CatalogItem>),
}

/// Row window `[(page-1)*size, page*size)` for a 1-based page.
pub fn page_bounds(page: u64, page_size: u64) -> PageRange {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let from = (page - 1).saturating_mul(page_size);
    PageRange { from, to: from.saturating_add(page_size) }
}

pub fn page_count(total_count: u64, page_size: u64) -> u64 {
    total_count.div_ceil(page_size.max(1))
}

pub fn has_next_page(page: u64, page_size: u64, total_count: u64) -> bool {
    page.max(1).saturating_mul(page_size.max(1)) < total_count
}

pub fn has_previous_page(page: u64) -> bool {
    page > 1
}

/// Pages past the end resolve to an empty item list, never an error.
pub fn resolve_page(source: PageSource, page: u64, page_size: u64) -> ResultPage {
    let page = page.max(1);
    match source {
        PageSource::Remote { mut items, total_count } => {
            items.truncate(usize::try_from(page_size.max(1)).unwrap_or(usize::MAX));
            ResultPage { items, total_count, page }
        }
        PageSource::Materialized(all) => {
            let total_count = all.len() as u64;
            let bounds = page_bounds(page, page_size);
            let from = usize::try_from(bounds.from).unwrap_or(usize::MAX);
            let to = usize::try_from(bounds.to).unwrap_or(usize::MAX).min(all.len());
            let items = if from >= to {
                Vec::new()
            } else {
                all.into_iter().skip(from).take(to - from).collect()
            };
            ResultPage { items, total_count, page }
        }
    }
}
