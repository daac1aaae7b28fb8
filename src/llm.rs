use anyhow::{anyhow, Result};
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::Ollama;
use tracing::{debug, error, info};

use crate::environment::Config;
use crate::TARGET_LLM_REQUEST;

/// Client for the local Ollama generation endpoint.
#[derive(Clone, Debug)]
pub struct LlmClient {
    ollama: Ollama,
    model: String,
    endpoint: String,
}

impl LlmClient {
    /// `host` may omit the scheme, in which case `http://` is assumed.
    pub fn new(host: &str, port: u16, model: &str) -> Result<Self> {
        let host = normalize_host(host);
        let mut url = url::Url::parse(&host).map_err(|e| anyhow!("Invalid Ollama host {:?}: {}", host, e))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(anyhow!("Ollama host {:?} has no host name", host));
        }
        url.set_port(Some(port))
            .map_err(|_| anyhow!("Ollama host {:?} cannot take a port", host))?;

        Ok(Self {
            ollama: Ollama::new(host, port),
            model: model.to_string(),
            endpoint: url.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.ollama_host, config.ollama_port, &config.model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one non-streaming generation request and returns the model's
    /// text. Failures are logged and produce an empty string; nothing is
    /// retried.
    pub async fn generate(&self, prompt: &str) -> String {
        debug!(target: TARGET_LLM_REQUEST, "Sending prompt to {} ({}): {}", self.endpoint, self.model, prompt);

        let request = GenerationRequest::new(self.model.clone(), prompt.to_string());
        match self.ollama.generate(request).await {
            Ok(response) => {
                debug!(target: TARGET_LLM_REQUEST, "LLM response received: {}", response.response);
                info!(target: TARGET_LLM_REQUEST, "Received {} characters from {}", response.response.len(), self.model);
                response.response
            }
            Err(e) => {
                error!(target: TARGET_LLM_REQUEST, "Error communicating with Ollama at {}: {}", self.endpoint, e);
                String::new()
            }
        }
    }

    /// Names of the models installed on the endpoint.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let models = self
            .ollama
            .list_local_models()
            .await
            .map_err(|e| anyhow!("Failed to list models at {}: {}", self.endpoint, e))?;
        Ok(models.into_iter().map(|m| m.name).collect())
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    host.trim_end_matches('/').to_string()
}
