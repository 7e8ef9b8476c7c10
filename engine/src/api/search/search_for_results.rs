//! Runs one filter state against the store and produces the displayed page.

use common::{filter_state::FilterState, search_result::ResultPage};
use tracing::debug;

use crate::{
    config::CatalogSchema,
    pager::{PageSource, resolve_page},
    query::{
        plan_request,
        sort_strategy::{SortStrategy, sort_locally},
    },
    store::CatalogStore,
};


pub async fn search_for_results(
    store: &dyn CatalogStore,
    state: &FilterState,
    schema: &CatalogSchema,
) -> anyhow::Result<ResultPage> {
    let plan = plan_request(state, schema);

    let source = match &plan.strategy {
        SortStrategy::RemotePageable(_) => {
            let response = store.fetch_rows(&plan.query).await?;
            PageSource::Remote { items: response.rows, total_count: response.total_count }
        }
        SortStrategy::LocalOnly(order) => {
            // the whole filtered set, in whatever order the store returns it
            let response = store.fetch_rows(&plan.query.unbounded()).await?;
            let mut rows = response.rows;
            debug!(rows = rows.len(), field = %order.field, "sorting catalog rows locally");
            sort_locally(&mut rows, order);
            PageSource::Materialized(rows)
        }
    };

    Ok(resolve_page(source, plan.page, plan.page_size))
}
