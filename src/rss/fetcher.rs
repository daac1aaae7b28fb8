//! Fetching a feed and keeping the entries about a topic.

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, warn};

use super::client::{create_http_client, fetch_feed};
use super::parser::{filter_entries, parse_entries};
use super::types::FeedEntry;
use super::util::is_valid_url;
use crate::TARGET_WEB_REQUEST;

/// Fetches feeds one request at a time; no retries, no caching.
#[derive(Clone, Debug)]
pub struct FeedFetcher {
    pub(super) client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: create_http_client(timeout)?,
        })
    }

    /// Returns at most `max_articles` entries of the feed at `feed_url` whose
    /// title or summary mentions `topic`, ignoring case.
    ///
    /// Any failure (bad address, network error, non-success status,
    /// unparsable body) is logged and yields an empty list.
    pub async fn fetch_articles(&self, feed_url: &str, topic: &str, max_articles: usize) -> Vec<FeedEntry> {
        if !is_valid_url(feed_url) {
            warn!(target: TARGET_WEB_REQUEST, "Skipping invalid feed URL: {:?}", feed_url);
            return Vec::new();
        }

        let response = match fetch_feed(&self.client, feed_url).await {
            Ok(response) => response,
            Err(err) => {
                warn!(target: TARGET_WEB_REQUEST, "{}", err);
                return Vec::new();
            }
        };

        let entries = match parse_entries(&response.body) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(target: TARGET_WEB_REQUEST, "Failed to parse feed from {}: {}", feed_url, err);
                return Vec::new();
            }
        };

        let total = entries.len();
        let matched = filter_entries(entries, topic, max_articles);
        debug!(
            target: TARGET_WEB_REQUEST,
            "{}: {} of {} entries match {:?}",
            feed_url,
            matched.len(),
            total,
            topic
        );
        matched
    }
}
