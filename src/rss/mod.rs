//! RSS feed processing.
//!
//! This module handles fetching and parsing outlet feeds and filtering their
//! entries down to the ones about a topic.

mod client;
mod fetcher;
mod parser;
mod types;
mod util;

pub use self::types::*;

pub use self::client::{create_http_client, fetch_feed, FeedResponse};
pub use self::fetcher::FeedFetcher;
pub use self::parser::{filter_entries, parse_entries};
pub use self::util::*;
