//! Grounding context assembly and source attribution

use crate::index::ScoredChunk;
use serde::{Deserialize, Serialize};

/// One displayable source reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRef {
    /// 1-based position of the excerpt in the grounding context
    pub idx: usize,
    pub title: String,
    pub source: String,
}

/// Build the numbered excerpt block handed to answer generation.
///
/// Excerpts keep candidate order, are capped at `excerpt_chars`, and are
/// prefixed with the document title when one is present.
pub fn build_context(candidates: &[ScoredChunk], excerpt_chars: usize) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let text = truncate(&c.metadata.text, excerpt_chars);
            if c.metadata.title.is_empty() {
                format!("[{}] {}", i + 1, text)
            } else {
                format!("[{}] ({}) {}", i + 1, c.metadata.title, text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Deduplicated source list for display alongside the answer.
///
/// One entry per distinct `(title, source)` pair, in first-seen order,
/// keeping the excerpt number of the first occurrence.
pub fn collect_sources(candidates: &[ScoredChunk]) -> Vec<SourceRef> {
    let mut sources: Vec<SourceRef> = Vec::new();

    for (i, c) in candidates.iter().enumerate() {
        let title = if c.metadata.title.is_empty() {
            "Unknown".to_string()
        } else {
            c.metadata.title.clone()
        };
        let source = if c.metadata.source.is_empty() {
            "Unknown".to_string()
        } else {
            c.metadata.source.clone()
        };

        let seen = sources
            .iter()
            .any(|s| s.title == title && s.source == source);
        if !seen {
            sources.push(SourceRef {
                idx: i + 1,
                title,
                source,
            });
        }
    }

    sources
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChunkMetadata;

    fn chunk(source: &str, title: &str, text: &str) -> ScoredChunk {
        ScoredChunk {
            score: 0.5,
            metadata: ChunkMetadata {
                source: source.to_string(),
                chunk: 0,
                title: title.to_string(),
                section: None,
                text: text.to_string(),
            },
        }
    }

    #[test]
    fn context_numbers_and_prefixes_excerpts() {
        let candidates = vec![
            chunk("cv.md", "CV", "led the data team"),
            chunk("projects.md", "", "built a forecasting model"),
        ];
        let ctx = build_context(&candidates, 300);
        assert_eq!(
            ctx,
            "[1] (CV) led the data team\n\n[2] built a forecasting model"
        );
    }

    #[test]
    fn context_caps_excerpt_length() {
        let candidates = vec![chunk("a.md", "", &"x".repeat(500))];
        let ctx = build_context(&candidates, 300);
        assert_eq!(ctx.len(), "[1] ".len() + 300);
    }

    #[test]
    fn sources_deduplicate_by_title_and_source() {
        let candidates = vec![
            chunk("cv.md", "CV", "a"),
            chunk("cv.md", "CV", "b"),
            chunk("projects.md", "Projects", "c"),
        ];
        let sources = collect_sources(&candidates);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].idx, 1);
        assert_eq!(sources[1].idx, 3);
        assert_eq!(sources[1].source, "projects.md");
    }

    #[test]
    fn missing_metadata_falls_back_to_unknown() {
        let sources = collect_sources(&[chunk("", "", "a")]);
        assert_eq!(sources[0].title, "Unknown");
        assert_eq!(sources[0].source, "Unknown");
    }
}
