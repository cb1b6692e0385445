//! Show the resolved configuration

use anyhow::Result;
use ragpipe_core::Config;

pub fn run(config: &Config) -> Result<()> {
    let mut redacted = config.clone();
    if redacted.llm_service.api_key.is_some() {
        redacted.llm_service.api_key = Some("<redacted>".to_string());
    }
    if redacted.vector_index.api_key.is_some() {
        redacted.vector_index.api_key = Some("<redacted>".to_string());
    }

    print!("{}", serde_yaml::to_string(&redacted)?);
    Ok(())
}
