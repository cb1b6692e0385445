//! Query expansion: paraphrase the question to widen retrieval recall

use crate::llm::{ChatMessage, CompletionModel};
use crate::pipeline::Question;

/// Expand a question into query variants.
///
/// The original question is always the first variant. At most
/// `max_paraphrases` paraphrases are appended from one LLM call. Any
/// failure of that call degrades to the original question alone; a lost
/// paraphrase is acceptable, a broken pipeline is not.
pub async fn expand_query(
    model: &dyn CompletionModel,
    question: &Question,
    max_paraphrases: usize,
) -> Vec<String> {
    let mut variants = vec![question.as_str().to_string()];

    if max_paraphrases == 0 {
        return variants;
    }

    let prompt = build_expansion_prompt(question.as_str(), max_paraphrases);
    let messages = vec![ChatMessage::user(prompt)];

    match model.complete(messages, 100, 0.3).await {
        Ok(response) => {
            let paraphrases = response
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .take(max_paraphrases)
                .map(str::to_string);
            variants.extend(paraphrases);
        }
        Err(e) => {
            tracing::warn!("Query expansion failed, using original question: {}", e);
        }
    }

    variants
}

fn build_expansion_prompt(question: &str, count: usize) -> String {
    format!(
        "Generate {} different ways to ask this question, keeping the same meaning \
         but using different words. Return only the paraphrases, one per line, no numbering:\n\n\
         Original: {}",
        count, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RagError, Result};
    use async_trait::async_trait;

    struct CannedModel(Result<String>);

    #[async_trait]
    impl CompletionModel for CannedModel {
        async fn complete(&self, _: Vec<ChatMessage>, _: u32, _: f32) -> Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(RagError::Llm("down".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn question() -> Question {
        Question::parse("What tools were used?", 600).unwrap()
    }

    #[tokio::test]
    async fn original_question_always_first() {
        let model = CannedModel(Ok("Which tools did you use?\nWhat was the tooling?".into()));
        let variants = expand_query(&model, &question(), 3).await;
        assert_eq!(variants[0], "What tools were used?");
        assert_eq!(variants.len(), 3);
    }

    #[tokio::test]
    async fn caps_paraphrase_count() {
        let model = CannedModel(Ok("a\nb\nc\nd\ne".into()));
        let variants = expand_query(&model, &question(), 3).await;
        assert_eq!(variants.len(), 4);
    }

    #[tokio::test]
    async fn skips_blank_lines() {
        let model = CannedModel(Ok("\n  \nfirst variant\n\nsecond variant\n".into()));
        let variants = expand_query(&model, &question(), 3).await;
        assert_eq!(variants[1], "first variant");
        assert_eq!(variants[2], "second variant");
        assert_eq!(variants.len(), 3);
    }

    #[tokio::test]
    async fn failure_degrades_to_singleton() {
        let model = CannedModel(Err(RagError::Llm("down".to_string())));
        let variants = expand_query(&model, &question(), 3).await;
        assert_eq!(variants, vec!["What tools were used?".to_string()]);
    }

    #[tokio::test]
    async fn zero_paraphrases_skips_the_call() {
        let model = CannedModel(Ok("should not be used".into()));
        let variants = expand_query(&model, &question(), 0).await;
        assert_eq!(variants.len(), 1);
    }
}
