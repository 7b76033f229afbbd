// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::ClientConfig;

/// Create a configured asynchronous HTTP client.
///
/// The client is meant to be built once and shared, so every fetch reuses
/// the same connection pool.
pub fn create_async_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(config.max_concurrent)
        .build()?;
    Ok(client)
}

/// Fetch a URL and return the body of a successful response.
///
/// Returns `Ok(None)` for `404 Not Found`; other non-2xx statuses are errors.
pub async fn fetch_text(client: &reqwest::Client, url: url::Url) -> Result<Option<String>> {
    let response = client.get(url).send().await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let text = response.error_for_status()?.text().await?;
    Ok(Some(text))
}
