//! Online retrieval pipeline
//!
//! One `Pipeline` invocation per question: expansion, multi-variant
//! retrieval and merge, MMR diversification, confidence gating, LLM
//! re-ranking, context assembly and answer generation. Each stage
//! absorbs its own external failures; every well-formed question ends in
//! exactly one terminal response.

mod context;
mod expand;
mod gate;
mod mmr;
mod question;
mod rerank;
mod retrieve;
mod similarity;

pub use context::{build_context, collect_sources, SourceRef};
pub use expand::expand_query;
pub use gate::{check_confidence, ConfidenceDecision};
pub use mmr::mmr_diversify;
pub use question::Question;
pub use rerank::rerank_candidates;
pub use retrieve::{merge_candidates, retrieve_candidates};
pub use similarity::metadata_similarity;

use crate::config::{Config, PipelineConfig};
use crate::error::Result;
use crate::index::{HttpVectorIndex, VectorIndex};
use crate::llm::{ChatMessage, CompletionModel, Embedder, OpenAiClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a pipeline invocation terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Grounded answer generated from retrieved context
    Answered,
    /// Evidence was weak; a clarifying question is returned instead
    Clarifying,
    /// Nothing relevant was found at all
    NoInfo,
    /// The answer-generation service is out of quota
    Unavailable,
}

/// Final response of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub low_confidence: bool,
    pub kind: ResponseKind,
}

impl Answer {
    fn no_info() -> Self {
        Self {
            answer: "I don't have enough information to answer that question. \
                     Try asking about something covered by the knowledge base."
                .to_string(),
            sources: vec![],
            low_confidence: true,
            kind: ResponseKind::NoInfo,
        }
    }

    fn unavailable() -> Self {
        Self {
            answer: "I'm currently experiencing high demand and can't process your \
                     request right now. Please try again later."
                .to_string(),
            sources: vec![],
            low_confidence: false,
            kind: ResponseKind::Unavailable,
        }
    }
}

/// Fallback when the clarifying-question call itself fails
const FALLBACK_CLARIFYING_QUESTION: &str =
    "Could you be more specific about what you'd like to know?";

/// The online retrieval pipeline
pub struct Pipeline {
    embedder: Arc<dyn Embedder>,
    completion: Arc<dyn CompletionModel>,
    index: Arc<dyn VectorIndex>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators
    pub fn new(
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionModel>,
        index: Arc<dyn VectorIndex>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            completion,
            index,
            config,
        }
    }

    /// Wire up the default HTTP collaborators from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(config.llm_service.clone())?);
        let index = Arc::new(HttpVectorIndex::new(config.vector_index.clone())?);

        Ok(Self::new(
            client.clone(),
            client,
            index,
            config.pipeline.clone(),
        ))
    }

    /// Answer one question.
    ///
    /// Rejects invalid input up front; afterwards every external failure
    /// degrades to a stage fallback or terminal response. Quota
    /// exhaustion on the final generation call yields the `Unavailable`
    /// response rather than an error.
    pub async fn answer_question(&self, raw_question: &str) -> Result<Answer> {
        let question = Question::parse(raw_question, self.config.max_question_chars)?;

        let variants = expand_query(
            self.completion.as_ref(),
            &question,
            self.config.max_paraphrases,
        )
        .await;
        tracing::debug!("Expanded into {} query variants", variants.len());

        let pool = retrieve_candidates(
            self.embedder.as_ref(),
            self.index.as_ref(),
            &variants,
            self.config.base_top_k,
        )
        .await;
        tracing::debug!("Retrieved {} unique candidates", pool.len());

        if pool.is_empty() {
            tracing::info!("No candidates retrieved, returning no-info response");
            return Ok(Answer::no_info());
        }

        let diversified = mmr_diversify(pool, self.config.diversify_size, self.config.mmr_lambda);

        let decision = check_confidence(&diversified, self.config.score_threshold);
        tracing::debug!(
            "Max score {:.3} against threshold {:.3}, low confidence: {}",
            decision.max_score,
            self.config.score_threshold,
            decision.low_confidence
        );

        if decision.low_confidence {
            let clarifying = self.clarifying_question(&question, &diversified).await;
            return Ok(Answer {
                answer: clarifying,
                sources: vec![],
                low_confidence: true,
                kind: ResponseKind::Clarifying,
            });
        }

        let reranked = rerank_candidates(
            self.completion.as_ref(),
            question.as_str(),
            diversified,
            self.config.rerank_final_size,
            self.config.rerank_skip_threshold,
            self.config.rerank_max_rating,
            self.config.rerank_excerpt_chars,
        )
        .await;

        let context = build_context(&reranked, self.config.excerpt_chars);
        let sources = collect_sources(&reranked);

        match self.generate_answer(&question, &context).await {
            Ok(answer) => Ok(Answer {
                answer,
                sources,
                low_confidence: false,
                kind: ResponseKind::Answered,
            }),
            Err(e) if e.is_quota_exhausted() => {
                tracing::warn!("Answer generation quota exhausted: {}", e);
                Ok(Answer::unavailable())
            }
            Err(e) => Err(e),
        }
    }

    /// One short clarifying question; soft-fails to a generic fallback
    async fn clarifying_question(
        &self,
        question: &Question,
        candidates: &[crate::index::ScoredChunk],
    ) -> String {
        let context = build_context(candidates, self.config.excerpt_chars);
        let prompt = format!(
            "Given this context, generate a single short clarifying question to help \
             understand what the user is asking about:\n\n\
             Context:\n{}\n\n\
             User question: {}\n\n\
             Generate one clarifying question (max 100 words):",
            context, question
        );

        match self
            .completion
            .complete(vec![ChatMessage::user(prompt)], 100, 0.2)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Clarifying question generation failed: {}", e);
                FALLBACK_CLARIFYING_QUESTION.to_string()
            }
        }
    }

    async fn generate_answer(&self, question: &Question, context: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(self.config.system_prompt.clone()),
            ChatMessage::user(format!(
                "Context:\n{}\n\nQuestion: {}",
                context, question
            )),
        ];

        self.completion.complete(messages, 250, 0.2).await
    }
}
