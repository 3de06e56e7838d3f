//! Ollama HTTP client
//!
//! Uses the non-streaming `/api/chat` endpoint; every prompt is sent as a
//! single user message with no prior history.

use super::ChatModel;
use crate::integration::config::ModelConfig;
use crate::{MurmurError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ReplyMessage>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

pub struct OllamaClient {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MurmurError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.host.trim_end_matches('/').to_string(),
            model: config.name.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    /// Names of the models the server has pulled
    pub fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.tags_url())
            .timeout(PROBE_TIMEOUT)
            .send()
            .map_err(|e| MurmurError::ModelError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(MurmurError::ModelError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let tags: TagsResponse = response
            .json()
            .map_err(|e| MurmurError::ModelError(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the configured model is among the pulled ones
    ///
    /// `mistral` matches `mistral:latest`.
    pub fn has_model(&self, models: &[String]) -> bool {
        models.iter().any(|name| {
            name == &self.model
                || name
                    .split_once(':')
                    .is_some_and(|(base, tag)| base == self.model && tag == "latest")
        })
    }
}

impl ChatModel for OllamaClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .map_err(|e| MurmurError::ModelError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(MurmurError::ModelError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let data: ChatResponse = response
            .json()
            .map_err(|e| MurmurError::ModelError(e.to_string()))?;
        if let Some(tokens) = data.eval_count {
            debug!("{} generated {} tokens", self.model, tokens);
        }
        Ok(data.message.map(|m| m.content).unwrap_or_default())
    }
}
