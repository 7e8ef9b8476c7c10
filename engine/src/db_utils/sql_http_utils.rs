//! HTTP transport for stores that accept SQL over a `/sql` endpoint and
//! answer with Elasticsearch-style JSON hits.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
pub struct RawSearchResult<T> {
    pub hits: RawSearchResultHits<T>,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub took: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RawSearchResultHits<T> {
    pub hits: Vec<RawSearchResultHit<T>>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RawSearchResultHit<T> {
    pub _source: T,
}

pub async fn sql_http_query<T: DeserializeOwned + std::fmt::Debug>(
    client: &reqwest::Client,
    base_url: &str,
    sql: String,
) -> anyhow::Result<RawSearchResult<T>> {
    let database_url = format!("{}/sql", base_url.trim_end_matches('/'));
    debug!(%database_url, %sql, "sending catalog query");
    let t0 = std::time::Instant::now();

    let response = client.post(database_url).body(sql).send().await?;
    let status = response.status();
    let response_txt = response.text().await?;
    if status.is_client_error() || status.is_server_error() {
        anyhow::bail!("Error: {}: {}", status, response_txt);
    }
    let dt_ms = t0.elapsed().as_millis() as u64;
    debug!(len = response_txt.len(), dt_ms, "catalog query answered");

    let response: RawSearchResult<T> = serde_json::from_str(&response_txt)?;
    if response.timed_out {
        anyhow::bail!("Catalog query timed out after {}ms", response.took);
    }
    Ok(response)
}
