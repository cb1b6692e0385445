//! Ragpipe Core Library
//!
//! Grounded question answering over a pre-built vector index.
//!
//! # Features
//! - Query expansion with soft-fail paraphrasing
//! - Concurrent multi-variant retrieval with score-keeping deduplication
//! - MMR diversification over a cheap metadata similarity
//! - Confidence gating with a clarifying-question fallback
//! - LLM relevance re-ranking with validated ratings

pub mod config;
pub mod error;
pub mod index;
pub mod limits;
pub mod llm;
pub mod pipeline;

pub use config::{Config, LlmServiceConfig, PipelineConfig, VectorIndexConfig};
pub use error::{Error, RagError, Result};
pub use index::{ChunkMetadata, HttpVectorIndex, ScoredChunk, VectorIndex};
pub use limits::{RequestLimiter, SlidingWindowLimiter};
pub use llm::{ChatMessage, CompletionModel, Embedder, OpenAiClient};
pub use pipeline::{Answer, Pipeline, Question, ResponseKind, SourceRef};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "ragpipe";
