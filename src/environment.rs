use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;
pub const DEFAULT_MODEL: &str = "gemma3:latest";
pub const DEFAULT_MAX_ARTICLES: usize = 3;
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment and optionally overridden on
/// the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub ollama_host: String,
    pub ollama_port: u16,
    pub model: String,
    pub max_articles: usize,
    /// `None` disables the feed request timeout.
    pub feed_timeout: Option<Duration>,
    /// Replacement outlet registry; the built-in list is used when unset.
    pub outlets_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            ollama_port: DEFAULT_OLLAMA_PORT,
            model: DEFAULT_MODEL.to_string(),
            max_articles: DEFAULT_MAX_ARTICLES,
            feed_timeout: Some(Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS)),
            outlets_path: None,
        }
    }
}

impl Config {
    /// Builds a configuration from `OLLAMA_HOST`, `OLLAMA_PORT`, `OLLAMA_MODEL`,
    /// `MAX_ARTICLES`, `FEED_TIMEOUT_SECS` and `OUTLETS_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads values through `lookup`, so the
    /// parsing rules can be exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let feed_timeout_secs =
            parse_or_default(non_empty("FEED_TIMEOUT_SECS"), "FEED_TIMEOUT_SECS", DEFAULT_FEED_TIMEOUT_SECS);

        Self {
            ollama_host: non_empty("OLLAMA_HOST").unwrap_or(defaults.ollama_host),
            ollama_port: parse_or_default(non_empty("OLLAMA_PORT"), "OLLAMA_PORT", DEFAULT_OLLAMA_PORT),
            model: non_empty("OLLAMA_MODEL").unwrap_or(defaults.model),
            max_articles: parse_or_default(non_empty("MAX_ARTICLES"), "MAX_ARTICLES", DEFAULT_MAX_ARTICLES),
            feed_timeout: timeout_from_secs(feed_timeout_secs),
            outlets_path: non_empty("OUTLETS_PATH").map(PathBuf::from),
        }
    }
}

/// Zero seconds means "no timeout".
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_or_default<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {} value {:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}
