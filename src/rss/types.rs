//! Type definitions for the RSS module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outlet::Outlet;

/// One entry as read from a feed, before it is attributed to an outlet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

/// An entry that matched the topic, tagged with the outlet it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

impl Article {
    pub fn from_entry(entry: FeedEntry, outlet: &Outlet) -> Self {
        Self {
            title: entry.title,
            summary: entry.summary,
            link: entry.link,
            source: outlet.name.clone(),
            country: outlet.country.clone(),
            published: entry.published,
        }
    }
}

/// Diagnostic status codes for RSS feed testing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RssFeedStatus {
    Success,
    InvalidUrl,
    RequestFailed,
    ParseError,
}

/// Detailed test results for an RSS feed
#[derive(Debug, Clone, Serialize)]
pub struct TestRssFeedResult {
    pub status: RssFeedStatus,
    pub http_status: Option<u16>,
    pub content_type: Option<String>,
    pub entries_found: usize,
    pub entries: Vec<FeedEntry>,
    /// Entries matching the topic, if one was given.
    pub matching: Vec<FeedEntry>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TestRssFeedResult {
    pub(crate) fn new() -> Self {
        Self {
            status: RssFeedStatus::Success,
            http_status: None,
            content_type: None,
            entries_found: 0,
            entries: Vec::new(),
            matching: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub const USER_AGENT: &str = concat!("newslens/", env!("CARGO_PKG_VERSION"));
