//! External inference services
//!
//! Provides traits and an OpenAI-compatible HTTP implementation for:
//! - Embedding generation
//! - Chat completions (query expansion, re-ranking, answer generation)

mod client;
mod traits;

pub use client::OpenAiClient;
pub use traits::{ChatMessage, CompletionModel, Embedder};
