//! Paging and timing constants for catalog browsing.

/// Items shown per page of the catalog directory.
pub const PAGE_SIZE: u64 = 12;

/// Quiet period before a changed filter state is sent to the store.
pub const DEBOUNCE_MS: u64 = 300;

/// Page numbers are 1-based.
pub const FIRST_PAGE: u64 = 1;
