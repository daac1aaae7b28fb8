//! The registry of news outlets whose feeds are compared.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A named news source with its feed address and country of origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlet {
    pub name: String,
    #[serde(rename = "url")]
    pub feed_url: String,
    pub country: String,
}

impl Outlet {
    pub fn new(name: &str, feed_url: &str, country: &str) -> Self {
        Self {
            name: name.to_string(),
            feed_url: feed_url.to_string(),
            country: country.to_string(),
        }
    }
}

const BUILTIN_OUTLETS: &[(&str, &str, &str)] = &[
    ("RT", "https://www.rt.com/rss/news/", "Russia"),
    ("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml", "Qatar"),
    ("CNN", "http://rss.cnn.com/rss/edition.rss", "USA"),
    ("Fox News", "http://feeds.foxnews.com/foxnews/latest", "USA"),
    ("BBC News", "http://feeds.bbci.co.uk/news/rss.xml", "UK"),
    ("The Guardian", "https://www.theguardian.com/world/rss", "UK"),
    ("Reuters", "http://feeds.reuters.com/reuters/topNews", "UK"),
    ("Deutsche Welle", "https://rss.dw.com/rdf/rss-en-all", "Germany"),
    ("France 24", "https://www.france24.com/en/rss", "France"),
    ("ABC News (Australia)", "https://www.abc.net.au/news/feed/51120/rss.xml", "Australia"),
    ("NDTV", "https://feeds.feedburner.com/ndtvnews-top-stories", "India"),
    ("The Times of India", "https://timesofindia.indiatimes.com/rssfeedstopstories.cms", "India"),
    ("China Daily", "http://www.chinadaily.com.cn/rss/china_rss.xml", "China"),
    ("Japan Times", "https://www.japantimes.co.jp/feed/", "Japan"),
    ("The New York Times", "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml", "USA"),
    ("Firstpost", "https://www.firstpost.com/feed/", "India"),
];

/// The built-in outlets, in declaration order. Fetching follows this order.
pub fn default_outlets() -> Vec<Outlet> {
    BUILTIN_OUTLETS
        .iter()
        .map(|(name, url, country)| Outlet::new(name, url, country))
        .collect()
}

/// Loads a replacement registry from a JSON file.
///
/// Two layouts are accepted:
/// - an object keyed by outlet name: `{"BBC News": {"url": "...", "country": "UK"}}`
/// - an array of outlets: `[{"name": "BBC News", "url": "...", "country": "UK"}]`
///
/// Object order in the file is kept.
pub fn load_outlets(path: &Path) -> Result<Vec<Outlet>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read outlet registry {}", path.display()))?;
    parse_outlets(&data).with_context(|| format!("Invalid outlet registry {}", path.display()))
}

/// Parses the registry formats accepted by [`load_outlets`].
pub fn parse_outlets(data: &str) -> Result<Vec<Outlet>> {
    #[derive(Deserialize)]
    struct FeedInfo {
        url: String,
        country: String,
    }

    let value: Value = serde_json::from_str(data)?;
    let outlets = match value {
        Value::Array(_) => serde_json::from_value::<Vec<Outlet>>(value)?,
        Value::Object(map) => {
            let mut outlets = Vec::with_capacity(map.len());
            for (name, info) in map {
                let info: FeedInfo = serde_json::from_value(info)
                    .with_context(|| format!("Outlet {:?} needs \"url\" and \"country\"", name))?;
                outlets.push(Outlet {
                    name,
                    feed_url: info.url,
                    country: info.country,
                });
            }
            outlets
        }
        _ => return Err(anyhow!("Expected a JSON object or array of outlets")),
    };

    if outlets.is_empty() {
        return Err(anyhow!("Outlet registry is empty"));
    }
    Ok(outlets)
}
