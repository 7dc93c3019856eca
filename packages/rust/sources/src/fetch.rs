//! HTTP fetching shared by all event sources.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use eventharvest_shared::{EventHarvestError, Result};

/// Identifying User-Agent string sent with every source request.
pub const USER_AGENT: &str = concat!("EventHarvest/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout; a slow source must not stall the whole run.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the HTTP client shared by all sources in a run.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| EventHarvestError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetch a page body. Non-2xx responses and transport errors are both
/// reported as [`EventHarvestError::Network`]; the owning source turns
/// either into "zero events plus a warning".
pub async fn fetch_html(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| EventHarvestError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(EventHarvestError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| EventHarvestError::Network(format!("{url}: body read failed: {e}")))
}
