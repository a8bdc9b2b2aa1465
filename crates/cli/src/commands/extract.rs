//! `pipewright extract`: self-reflecting entity extraction.

use std::path::PathBuf;

use pipewright_agent::ReflectingExtractor;
use tokio::io::AsyncReadExt;
use tracing::warn;

use super::load_config;

pub async fn run(
    text: Option<String>,
    file: Option<PathBuf>,
    max_loops: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config()?;
    if let Some(max_loops) = max_loops {
        config.extraction.max_loops = max_loops;
    }
    let provider = pipewright_providers::build_provider(&config)?;

    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    if text.trim().is_empty() {
        return Err("No text to extract from".into());
    }

    let outcome = ReflectingExtractor::from_config(provider, &config)
        .run(&text)
        .await?;

    if !outcome.is_accepted() {
        warn!(
            iterations = outcome.iterations,
            "Model never confirmed its entities, showing the last attempt"
        );
    }

    match outcome.parse_entities() {
        Ok(entities) => println!("{}", serde_json::to_string_pretty(&entities)?),
        Err(e) => {
            warn!(error = %e, "Entities do not match the Person/Location/Date schema");
            println!("{}", outcome.entities.trim());
        }
    }

    Ok(())
}
