//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Pipeline tuning knobs
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// LLM service configuration (chat completions + embeddings)
    #[serde(default)]
    pub llm_service: LlmServiceConfig,

    /// Vector index service configuration
    #[serde(default)]
    pub vector_index: VectorIndexConfig,
}

/// Tuning knobs for the retrieval pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Nearest-neighbor matches fetched per query variant
    #[serde(default = "default_base_top_k")]
    pub base_top_k: usize,

    /// Target size of the diversified candidate set
    #[serde(default = "default_diversify_size")]
    pub diversify_size: usize,

    /// MMR relevance/diversity trade-off in [0,1]; 1.0 is pure top-K by score
    #[serde(default = "default_mmr_lambda")]
    pub mmr_lambda: f64,

    /// Minimum max-score for answering directly; below it we ask a
    /// clarifying question instead
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,

    /// Maximum number of paraphrases added by query expansion
    #[serde(default = "default_max_paraphrases")]
    pub max_paraphrases: usize,

    /// Maximum candidates kept after relevance re-ranking
    #[serde(default = "default_rerank_final_size")]
    pub rerank_final_size: usize,

    /// Re-ranking is skipped when the candidate set is this size or smaller
    #[serde(default = "default_rerank_skip_threshold")]
    pub rerank_skip_threshold: usize,

    /// Upper bound of the integer relevance rating scale (0..=N)
    #[serde(default = "default_rerank_max_rating")]
    pub rerank_max_rating: u32,

    /// Questions are truncated to this many characters
    #[serde(default = "default_max_question_chars")]
    pub max_question_chars: usize,

    /// Excerpt length used when assembling the grounding context
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// Excerpt length used in the re-ranking prompt
    #[serde(default = "default_rerank_excerpt_chars")]
    pub rerank_excerpt_chars: usize,

    /// System prompt for answer generation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_top_k: env_usize("RAGPIPE_TOPK_BASE").unwrap_or_else(default_base_top_k),
            diversify_size: env_usize("RAGPIPE_TOPK_FINAL").unwrap_or_else(default_diversify_size),
            mmr_lambda: env_f64("RAGPIPE_MMR_LAMBDA").unwrap_or_else(default_mmr_lambda),
            score_threshold: env_f64("RAGPIPE_SCORE_THRESHOLD")
                .unwrap_or_else(default_score_threshold),
            max_paraphrases: default_max_paraphrases(),
            rerank_final_size: default_rerank_final_size(),
            rerank_skip_threshold: default_rerank_skip_threshold(),
            rerank_max_rating: default_rerank_max_rating(),
            max_question_chars: default_max_question_chars(),
            excerpt_chars: default_excerpt_chars(),
            rerank_excerpt_chars: default_rerank_excerpt_chars(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_base_top_k() -> usize {
    6
}

fn default_diversify_size() -> usize {
    5
}

fn default_mmr_lambda() -> f64 {
    0.7
}

fn default_score_threshold() -> f64 {
    0.5
}

fn default_max_paraphrases() -> usize {
    3
}

fn default_rerank_final_size() -> usize {
    5
}

fn default_rerank_skip_threshold() -> usize {
    3
}

fn default_rerank_max_rating() -> u32 {
    3
}

fn default_max_question_chars() -> usize {
    600
}

fn default_excerpt_chars() -> usize {
    300
}

fn default_rerank_excerpt_chars() -> usize {
    200
}

fn default_system_prompt() -> String {
    std::env::var("RAGPIPE_SYSTEM_PROMPT").unwrap_or_else(|_| {
        "You are a portfolio assistant. Use only the provided context. \
         Respond in concise UK English. Prefer specifics (roles, tools, outcomes). \
         Include short citations like [1], [2]. If the context is weak, ask a brief \
         clarifying question first. If still unknown, say you don't know."
            .to_string()
    })
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (expansion, re-ranking, answers)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LlmServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LlmServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGPIPE_LLM_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("RAGPIPE_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("RAGPIPE_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("RAGPIPE_EMBED_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string())
}

fn default_timeout() -> u64 {
    30
}

/// Vector index service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Base URL of the index (e.g. a Pinecone index endpoint)
    pub url: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("RAGPIPE_INDEX_URL")
                .unwrap_or_else(|_| "http://localhost:8100".to_string()),
            api_key: std::env::var("RAGPIPE_INDEX_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Load config from default path, falling back to env-based defaults
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults_match_documented_knobs() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.base_top_k, 6);
        assert_eq!(cfg.diversify_size, 5);
        assert!((cfg.mmr_lambda - 0.7).abs() < 1e-9);
        assert!((cfg.score_threshold - 0.5).abs() < 1e-9);
        assert_eq!(cfg.max_paraphrases, 3);
        assert_eq!(cfg.rerank_final_size, 5);
        assert_eq!(cfg.rerank_skip_threshold, 3);
        assert_eq!(cfg.rerank_max_rating, 3);
        assert_eq!(cfg.max_question_chars, 600);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let yaml = "pipeline:\n  mmr_lambda: 0.5\nllm_service:\n  url: http://localhost:9000\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!((cfg.pipeline.mmr_lambda - 0.5).abs() < 1e-9);
        assert_eq!(cfg.pipeline.base_top_k, 6);
        assert_eq!(cfg.llm_service.url, "http://localhost:9000");
        assert_eq!(cfg.llm_service.model, "gpt-4o-mini");
    }
}
