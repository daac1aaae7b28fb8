//! Feed parsing and topic filtering.

use anyhow::{anyhow, Result};
use feed_rs::model::Entry;
use feed_rs::parser;
use std::io::Cursor;
use tracing::debug;

use super::types::FeedEntry;
use super::util::{body_preview, cleanup_xml, contains_topic};
use crate::TARGET_WEB_REQUEST;

/// Parses an RSS, Atom or JSON feed body into entries, in feed order.
///
/// A body that fails to parse gets one more attempt after [`cleanup_xml`].
pub fn parse_entries(body: &[u8]) -> Result<Vec<FeedEntry>> {
    match parser::parse(Cursor::new(body)) {
        Ok(feed) => Ok(feed.entries.into_iter().map(to_feed_entry).collect()),
        Err(first_err) => {
            let text = String::from_utf8_lossy(body);
            let cleaned = cleanup_xml(&text);

            if !(cleaned.contains("<rss") || cleaned.contains("<feed") || cleaned.contains("<rdf:RDF")) {
                return Err(anyhow!(
                    "Content is not an RSS or Atom feed ({}). Content preview: {}",
                    first_err,
                    body_preview(body, 100)
                ));
            }

            debug!(target: TARGET_WEB_REQUEST, "Retrying feed parse after XML cleanup: {}", first_err);
            match parser::parse(Cursor::new(cleaned.as_bytes())) {
                Ok(feed) => Ok(feed.entries.into_iter().map(to_feed_entry).collect()),
                Err(second_err) => Err(anyhow!(
                    "Failed to parse feed even after cleanup. First error: {}. Second error: {}",
                    first_err,
                    second_err
                )),
            }
        }
    }
}

fn to_feed_entry(entry: Entry) -> FeedEntry {
    // Feeds without a summary/description fall back to the content body.
    let summary = entry
        .summary
        .map(|s| s.content)
        .filter(|s| !s.is_empty())
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    FeedEntry {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        summary,
        link: entry
            .links
            .first()
            .map(|link| link.href.clone())
            .unwrap_or_default(),
        published: entry.published.or(entry.updated),
    }
}

/// Keeps at most `max_articles` entries whose title or summary mentions
/// `topic`, scanning in feed order.
pub fn filter_entries(entries: Vec<FeedEntry>, topic: &str, max_articles: usize) -> Vec<FeedEntry> {
    entries
        .into_iter()
        .filter(|entry| contains_topic(&entry.title, topic) || contains_topic(&entry.summary, topic))
        .take(max_articles)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example World</title>
    <link>https://news.example/</link>
    <description>Example feed</description>
    <item>
      <title>Election day arrives</title>
      <link>https://news.example/1</link>
      <description>Voters head to the polls.</description>
      <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Weather update</title>
      <link>https://news.example/2</link>
      <description>Storms expected after the ELECTION.</description>
    </item>
    <item>
      <title>Sports roundup</title>
      <link>https://news.example/3</link>
      <description>Nothing political here.</description>
    </item>
  </channel>
</rss>"#;

    fn entry(title: &str, summary: &str) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            summary: summary.to_string(),
            link: format!("https://news.example/{}", title.len()),
            published: None,
        }
    }

    #[test]
    fn test_parse_rss_entries() {
        let entries = parse_entries(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "Election day arrives");
        assert_eq!(entries[0].summary, "Voters head to the polls.");
        assert_eq!(entries[0].link, "https://news.example/1");
        assert!(entries[0].published.is_some());
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn test_parse_atom_entries() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Example</title>
  <id>urn:example</id>
  <updated>2025-01-06T10:00:00Z</updated>
  <entry>
    <title>Summit talks</title>
    <id>urn:example:1</id>
    <link href="https://atom.example/1"/>
    <updated>2025-01-06T10:00:00Z</updated>
    <summary>Leaders meet to discuss trade.</summary>
  </entry>
</feed>"#;
        let entries = parse_entries(atom.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Summit talks");
        assert_eq!(entries[0].link, "https://atom.example/1");
        assert_eq!(entries[0].summary, "Leaders meet to discuss trade.");
    }

    #[test]
    fn test_parse_rejects_non_feed() {
        let err = parse_entries(b"<html><body>Not a feed</body></html>").unwrap_err();
        assert!(err.to_string().contains("not an RSS or Atom feed"));
    }

    #[test]
    fn test_parse_recovers_after_cleanup() {
        let messy = format!("\n\n<!-- cache -->garbage {}", RSS.replace("Voters head", "Voters&nbsp;head"));
        let entries = parse_entries(messy.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_filter_matches_title_or_summary() {
        let entries = parse_entries(RSS.as_bytes()).unwrap();
        let matched = filter_entries(entries, "election", 3);
        let titles: Vec<&str> = matched.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Election day arrives", "Weather update"]);
    }

    #[test]
    fn test_filter_never_exceeds_max() {
        let entries: Vec<FeedEntry> = (0..10)
            .map(|i| entry(&format!("Trade story {}", i), "tariffs"))
            .collect();
        assert_eq!(filter_entries(entries.clone(), "trade", 3).len(), 3);
        assert_eq!(filter_entries(entries.clone(), "trade", 1).len(), 1);
        assert!(filter_entries(entries.clone(), "trade", 0).is_empty());
        assert_eq!(filter_entries(entries, "TARIFFS", 20).len(), 10);
    }

    #[test]
    fn test_filter_keeps_feed_order() {
        let entries = vec![entry("b climate", ""), entry("a", "CLIMATE"), entry("c", "none")];
        let matched = filter_entries(entries, "Climate", 5);
        assert_eq!(matched[0].title, "b climate");
        assert_eq!(matched[1].title, "a");
    }
}
