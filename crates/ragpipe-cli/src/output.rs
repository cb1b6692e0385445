//! Answer rendering

use crate::app::OutputFormat;
use anyhow::Result;
use ragpipe_core::{Answer, ResponseKind};

/// Print one answer in the requested format
pub fn render(answer: &Answer, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(answer)?);
        }
        OutputFormat::Cli => {
            println!("{}", answer.answer);

            match answer.kind {
                ResponseKind::Clarifying => {
                    println!("\n(low confidence - please clarify and ask again)");
                }
                ResponseKind::Answered if !answer.sources.is_empty() => {
                    println!("\nSources:");
                    for source in &answer.sources {
                        println!("  [{}] {} ({})", source.idx, source.title, source.source);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}
