//! Interactive question loop

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use ragpipe_core::{Config, Pipeline, RequestLimiter, SlidingWindowLimiter};
use std::io::{BufRead, Write};

const LIMITER_KEY: &str = "local";

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let limiter = SlidingWindowLimiter::default();

    println!("Ask a question (empty line or Ctrl-D to quit)");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        let question = line.trim();
        if question.is_empty() {
            break;
        }

        if !limiter.check(LIMITER_KEY) {
            println!("Rate limit exceeded. Please wait before asking again.");
            continue;
        }

        match pipeline.answer_question(question).await {
            Ok(answer) => output::render(&answer, format)?,
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}
