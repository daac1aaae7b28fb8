//! HTTP client creation and request handling for RSS feeds.

use anyhow::{anyhow, Result};
use reqwest::header;
use std::time::Duration;
use tracing::debug;

use super::types::USER_AGENT;
use crate::TARGET_WEB_REQUEST;

/// Builds the client used for every feed request.
pub fn create_http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default());

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// A fetched feed body along with the response metadata worth reporting.
pub struct FeedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// GETs `url` and returns the body of a successful response.
///
/// Non-success statuses are reported as errors carrying the status code.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<FeedResponse> {
    debug!(target: TARGET_WEB_REQUEST, "Loading RSS feed from {}", url);

    let response = client
        .get(url)
        .header(
            header::ACCEPT,
            "application/rss+xml, application/atom+xml, application/feed+json, application/xml, text/xml, */*;q=0.9",
        )
        .send()
        .await
        .map_err(|e| anyhow!("Request to {} failed: {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Non-success status {} from {}", status, url));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response
        .bytes()
        .await
        .map_err(|e| anyhow!("Failed to read response body from {}: {}", url, e))?;

    debug!(target: TARGET_WEB_REQUEST, "Request to {} succeeded with status {}, {} bytes", url, status, body.len());

    Ok(FeedResponse {
        status: status.as_u16(),
        content_type,
        body: body.to_vec(),
    })
}
