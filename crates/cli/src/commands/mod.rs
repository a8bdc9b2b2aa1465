//! Subcommand implementations.

pub mod chat;
pub mod dispatch;
pub mod extract;
pub mod index;
pub mod news;
pub mod rag;

use pipewright_config::AppConfig;

/// Load configuration, turning failures into a CLI error.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}
