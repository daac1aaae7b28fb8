//! The analysis run for one topic: fetch every outlet, build the prompt, ask
//! the model once.

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::environment::Config;
use crate::llm::LlmClient;
use crate::outlet::{default_outlets, load_outlets, Outlet};
use crate::prompt::{build_prompt, AnalysisContext};
use crate::rss::{Article, FeedFetcher};

/// The outcome of one run. Replaced wholesale by the next run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub prompt: String,
    pub response: String,
    pub articles: Vec<Article>,
}

#[derive(Clone, Debug)]
pub struct Analyzer {
    outlets: Vec<Outlet>,
    fetcher: FeedFetcher,
    llm: LlmClient,
    max_articles: usize,
}

impl Analyzer {
    pub fn new(outlets: Vec<Outlet>, fetcher: FeedFetcher, llm: LlmClient, max_articles: usize) -> Self {
        Self {
            outlets,
            fetcher,
            llm,
            max_articles,
        }
    }

    /// Wires up the registry, feed client and model client from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let outlets = match &config.outlets_path {
            Some(path) => load_outlets(path)?,
            None => default_outlets(),
        };
        let fetcher = FeedFetcher::new(config.feed_timeout)?;
        let llm = LlmClient::from_config(config)?;
        Ok(Self::new(outlets, fetcher, llm, config.max_articles))
    }

    pub fn outlets(&self) -> &[Outlet] {
        &self.outlets
    }

    pub fn llm(&self) -> &LlmClient {
        &self.llm
    }

    /// Fetches every outlet in registry order and tags matches with the
    /// outlet's name and country. Outlets that fail contribute nothing.
    pub async fn collect_articles(&self, topic: &str) -> Vec<Article> {
        let mut all_articles = Vec::new();

        for outlet in &self.outlets {
            let entries = self
                .fetcher
                .fetch_articles(&outlet.feed_url, topic, self.max_articles)
                .await;
            for entry in entries {
                all_articles.push(Article::from_entry(entry, outlet));
                info!(
                    "Found {} articles from {} on topic '{}'",
                    all_articles.len(),
                    outlet.name,
                    topic
                );
            }
        }

        all_articles
    }

    /// Runs the whole pipeline for `topic`.
    ///
    /// Fails only when the topic is blank or no outlet had a matching
    /// article; a failed model call still produces a result, with an empty
    /// response.
    pub async fn analyze(&self, topic: &str) -> Result<AnalysisResult> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(anyhow!("Please enter a topic."));
        }

        let articles = self.collect_articles(topic).await;
        if articles.is_empty() {
            return Err(anyhow!("No articles found for topic: {}", topic));
        }

        let context = AnalysisContext::new(topic, articles);
        let prompt = build_prompt(&context);
        debug!("Prompt for topic '{}': {}", topic, prompt);

        let response = self.llm.generate(&prompt).await;

        Ok(AnalysisResult {
            prompt,
            response,
            articles: context.articles,
        })
    }
}
