//! One-shot question answering

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use ragpipe_core::{Config, Pipeline};

pub async fn run(question: &str, config: &Config, format: OutputFormat) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let answer = pipeline.answer_question(question).await?;
    output::render(&answer, format)
}
