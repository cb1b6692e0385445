//! Vector index service client
//!
//! The index itself is built offline; at query time it is a remote
//! nearest-neighbor lookup returning scored chunks with their metadata.

use crate::config::VectorIndexConfig;
use crate::error::{RagError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metadata stored alongside each indexed chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Document identifier
    pub source: String,
    /// Chunk position within the document
    pub chunk: i64,
    /// Document title
    #[serde(default)]
    pub title: String,
    /// Optional section heading
    #[serde(default)]
    pub section: Option<String>,
    /// Bounded-length excerpt of the chunk body
    #[serde(default)]
    pub text: String,
}

/// One scored nearest-neighbor match
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredChunk {
    /// Similarity score assigned by the index (higher is more relevant)
    pub score: f64,
    pub metadata: ChunkMetadata,
}

impl ScoredChunk {
    /// Key identifying the underlying chunk across variant queries
    pub fn dedup_key(&self) -> (&str, i64) {
        (&self.metadata.source, self.metadata.chunk)
    }
}

/// Vector index query trait
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query the index for the top-K nearest matches to a vector
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<ScoredChunk>>;
}

/// Pinecone-style HTTP vector index client
pub struct HttpVectorIndex {
    http_client: reqwest::Client,
    config: VectorIndexConfig,
}

impl HttpVectorIndex {
    /// Create a new client from configuration
    pub fn new(config: VectorIndexConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RagError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<ScoredChunk>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct QueryRequest<'a> {
            vector: &'a [f32],
            top_k: usize,
            include_metadata: bool,
        }

        #[derive(Deserialize)]
        struct QueryResponse {
            #[serde(default)]
            matches: Vec<ScoredChunk>,
        }

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata,
        };

        let url = format!("{}/query", self.config.url);
        let mut req = self.http_client.post(&url).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Api-Key", api_key);
        }

        let response = req.send().await.map_err(RagError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Service(format!(
                "Vector index error (HTTP {}): {}",
                status, body
            )));
        }

        let query_response: QueryResponse = response.json().await.map_err(RagError::Http)?;

        Ok(query_response.matches)
    }
}
