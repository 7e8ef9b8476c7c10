use common::{
    filter_state::{FilterAction, FilterState, RangeBounds, SortKey},
    search_result::{CatalogItem, FacetValue},
};

use super::search_for_results;
use crate::{
    config::CatalogSchema,
    pager::page_count,
    query::sort_strategy::{LocalOrder, sort_locally},
    store::MemoryStore,
    test_fixtures::{ids, mixed_popularity_fixture, model_fixture},
};

fn state(page_size: u64, sort_key: SortKey) -> FilterState {
    FilterState::with_page_size(page_size).apply(FilterAction::SetSortKey(sort_key))
}

async fn run(store: &MemoryStore, state: &FilterState) -> common::search_result::ResultPage {
    search_for_results(store, state, &CatalogSchema::default()).await.unwrap()
}

#[tokio::test]
async fn category_and_download_floor_sorted_by_name() {
    let store = MemoryStore::new(model_fixture());
    let state = state(2, SortKey::NameAsc)
        .apply(FilterAction::ToggleFacetValue { facet: "category".into(), value: "LLM".into() })
        .apply(FilterAction::SetRange { range: "downloads".into(), bounds: RangeBounds::at_least(1000.0) });

    let page = run(&store, &state).await;
    assert_eq!(ids(&page.items), vec!["falcon-180b", "llama-3"]);
    assert_eq!(page.total_count, 3);
    assert_eq!(page.page, 1);
}

#[tokio::test]
async fn mixed_popularity_is_coerced_and_sorted_locally() {
    let store = MemoryStore::new(mixed_popularity_fixture());
    let first = state(2, SortKey::PopularityDesc);

    let page = run(&store, &first).await;
    assert_eq!(ids(&page.items), vec!["alpha", "beta"]);
    assert_eq!(page.total_count, 3);

    let ascending = run(&store, &state(2, SortKey::PopularityAsc)).await;
    assert_eq!(ids(&ascending.items), vec!["gamma", "beta"]);

    let second = first.apply(FilterAction::SetPage(2));
    let page = run(&store, &second).await;
    assert_eq!(ids(&page.items), vec!["gamma"]);
    assert_eq!(page.total_count, 3);
    assert_eq!(page.page, 2);
}

#[tokio::test]
async fn inverted_range_returns_empty_page() {
    let store = MemoryStore::new(model_fixture());
    for sort_key in [SortKey::NameAsc, SortKey::PopularityDesc] {
        let state = state(2, sort_key).apply(FilterAction::SetRange {
            range: "downloads".into(),
            bounds: RangeBounds::new(Some(500.0), Some(100.0)),
        });
        let page = run(&store, &state).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
    }
}

#[tokio::test]
async fn facets_are_anded_and_values_ored() {
    let store = MemoryStore::new(model_fixture());
    let state = state(10, SortKey::NameAsc)
        .apply(FilterAction::ToggleFacetValue { facet: "category".into(), value: "LLM".into() })
        .apply(FilterAction::SetEqualityFacet {
            facet: "organization".into(),
            values: ["Meta", "Mistral", "Stability"].into_iter().map(FacetValue::from).collect(),
        });
    let page = run(&store, &state).await;
    assert_eq!(ids(&page.items), vec!["llama-3", "mistral-7b"]);
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn membership_facet_matches_any_tag() {
    let store = MemoryStore::new(model_fixture());
    let state = state(10, SortKey::NameAsc)
        .apply(FilterAction::ToggleMembershipValue { facet: "access_types".into(), value: "hosted".into() });
    let page = run(&store, &state).await;
    assert_eq!(ids(&page.items), vec!["falcon-180b", "gpt-4o"]);
}

#[tokio::test]
async fn text_search_and_stale_facet_value() {
    let store = MemoryStore::new(model_fixture());
    let chat = state(10, SortKey::Newest).apply(FilterAction::SetSearchText("  Chat ".into()));
    let page = run(&store, &chat).await;
    assert_eq!(ids(&page.items), vec!["gpt-4o", "llama-3"]);

    let gone = state(10, SortKey::NameAsc)
        .apply(FilterAction::ToggleFacetValue { facet: "organization".into(), value: "Defunct Labs".into() });
    let page = run(&store, &gone).await;
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn most_popular_row_reaches_first_page_from_the_end_of_the_fetch() {
    // llama-3 is the most popular model but the store returns it last
    let mut rows = model_fixture();
    let llama = rows.remove(1);
    rows.push(llama);
    let store = MemoryStore::new(rows.clone());
    let page_size = 2;

    let page = run(&store, &state(page_size, SortKey::PopularityDesc)).await;
    assert_eq!(ids(&page.items), vec!["llama-3", "sdxl"]);
    assert_eq!(page.total_count, 5);

    // sorting only the first store page would have missed it
    let mut first_store_page = rows.into_iter().take(page_size as usize).collect::<Vec<CatalogItem>>();
    sort_locally(&mut first_store_page, &LocalOrder { field: "stars".into(), descending: true });
    assert!(!ids(&first_store_page).contains(&"llama-3".to_string()));
}

#[tokio::test]
async fn pages_cover_the_result_exactly_once_on_both_paths() {
    let store = MemoryStore::new(model_fixture());
    let expected = [
        (SortKey::NameAsc, vec!["falcon-180b", "gpt-4o", "llama-3", "mistral-7b", "sdxl"]),
        (SortKey::PopularityDesc, vec!["llama-3", "sdxl", "mistral-7b", "falcon-180b", "gpt-4o"]),
        (SortKey::PopularityAsc, vec!["gpt-4o", "falcon-180b", "mistral-7b", "sdxl", "llama-3"]),
        (SortKey::Oldest, vec!["sdxl", "falcon-180b", "mistral-7b", "llama-3", "gpt-4o"]),
    ];
    for (sort_key, expected) in expected {
        let base = state(2, sort_key);
        let mut seen = Vec::new();
        let pages = page_count(expected.len() as u64, 2);
        for page in 1..=pages {
            let result = run(&store, &base.apply(FilterAction::SetPage(page))).await;
            assert_eq!(result.total_count, 5);
            assert!(result.items.len() <= 2);
            seen.extend(ids(&result.items));
        }
        assert_eq!(seen, expected, "{sort_key:?}");

        let past_end = run(&store, &base.apply(FilterAction::SetPage(pages + 1))).await;
        assert!(past_end.items.is_empty(), "{sort_key:?}");
        assert_eq!(past_end.total_count, 5);
    }
}

#[tokio::test]
async fn empty_entries_do_not_change_results() {
    let store = MemoryStore::new(model_fixture());
    let clean = state(3, SortKey::NameDesc)
        .apply(FilterAction::ToggleFacetValue { facet: "tier".into(), value: "free".into() });
    let mut noisy = clean.clone();
    noisy.search_text = "   ".into();
    noisy.equality_filters.insert("organization".into(), Default::default());
    noisy.range_filters.insert("likes".into(), RangeBounds::default());

    let a = run(&store, &clean).await;
    let b = run(&store, &noisy).await;
    assert_eq!(a, b);
    assert_eq!(ids(&a.items), vec!["sdxl", "mistral-7b", "llama-3"]);
}
