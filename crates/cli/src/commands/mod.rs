pub mod doctor;
pub mod ingest;
pub mod serve;

use anyhow::Context;
use innkeep_config::AppConfig;
use innkeep_providers::{AnthropicProvider, OpenAiEmbeddings};
use std::path::Path;
use std::sync::Arc;

/// Load and validate the configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    AppConfig::load_from(path).context("failed to load configuration")
}

/// Build the chat provider from config.
pub fn build_provider(config: &AppConfig) -> anyhow::Result<Arc<AnthropicProvider>> {
    let api_key = config
        .provider
        .api_key
        .as_deref()
        .context("no model API key configured (set ANTHROPIC_API_KEY)")?;

    let mut provider = AnthropicProvider::new(api_key)?;
    if let Some(base_url) = &config.provider.base_url {
        provider = provider.with_base_url(base_url);
    }
    Ok(Arc::new(provider))
}

/// Build the embedding provider from config, if a key is configured.
pub fn build_embedder(config: &AppConfig) -> anyhow::Result<Option<Arc<OpenAiEmbeddings>>> {
    let Some(api_key) = config.embeddings.api_key.as_deref() else {
        return Ok(None);
    };

    let mut embedder = OpenAiEmbeddings::new(api_key)?;
    if let Some(base_url) = &config.embeddings.base_url {
        embedder = embedder.with_base_url(base_url);
    }
    Ok(Some(Arc::new(embedder)))
}
