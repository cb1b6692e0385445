//! HTTP client for OpenAI-compatible inference services

use crate::config::LlmServiceConfig;
use crate::error::{RagError, Result};
use crate::llm::{ChatMessage, CompletionModel, Embedder};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible client serving both chat completions and embeddings
pub struct OpenAiClient {
    http_client: reqwest::Client,
    config: LlmServiceConfig,
}

impl OpenAiClient {
    /// Create a new client from configuration
    pub fn new(config: LlmServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RagError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            req.header("Authorization", format!("Bearer {}", api_key))
        } else {
            req
        }
    }
}

/// Map a non-success response to an error, distinguishing quota exhaustion
async fn error_from_response(service: &str, response: reqwest::Response) -> RagError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || body.contains("insufficient_quota") {
        RagError::QuotaExhausted(format!("{} (HTTP {})", service, status))
    } else {
        RagError::Service(format!("{} error (HTTP {}): {}", service, status, body))
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
            max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);
        let req = self.auth(self.http_client.post(&url).json(&request));

        let response = req.send().await.map_err(RagError::Http)?;

        if !response.status().is_success() {
            return Err(error_from_response("LLM service", response).await);
        }

        let chat_response: ChatResponse = response.json().await.map_err(RagError::Http)?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Llm("No response from LLM".to_string()))?
            .message
            .content;

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct EmbedRequest {
            model: String,
            input: String,
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: self.config.embedding_model.clone(),
            input: text.to_string(),
        };

        let url = format!("{}/v1/embeddings", self.config.embeddings_url());
        let req = self.auth(self.http_client.post(&url).json(&request));

        let response = req.send().await.map_err(RagError::Http)?;

        if !response.status().is_success() {
            return Err(error_from_response("Embedding service", response).await);
        }

        let embed_response: EmbedResponse = response.json().await.map_err(RagError::Http)?;

        embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::Llm("No embedding returned".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}
