//! `innkeep serve` — Start the HTTP gateway.

use super::{build_embedder, build_provider, load_config};
use innkeep_core::{Notifier, Provider, ToolRegistry};
use innkeep_engine::{ChatEngine, EngineSettings, PromptAssembler};
use innkeep_gateway::GatewayState;
use innkeep_knowledge::{RetrievalEngine, SqliteKnowledgeStore};
use innkeep_notify::{NoopNotifier, WhatsAppNotifier};
use innkeep_session::SqliteSessionStore;
use innkeep_tools::{WebSearchClient, WebSearchTool};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub async fn run(config_path: &Path, port_override: Option<u16>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let provider = build_provider(&config)?;

    // Without an embedding key, retrieval degrades to no context; the
    // chat provider's default embed() reports the capability as missing.
    let embedder: Arc<dyn Provider> = match build_embedder(&config)? {
        Some(e) => e,
        None => {
            warn!("no embedding API key configured; retrieval will return no context");
            provider.clone()
        }
    };

    let knowledge = Arc::new(SqliteKnowledgeStore::new(&config.storage.knowledge_path).await?);
    let sessions = Arc::new(SqliteSessionStore::new(&config.storage.sessions_path).await?);

    let retrieval = RetrievalEngine::new(
        embedder,
        knowledge,
        config.embeddings.model.clone(),
        config.retrieval.top_k,
        config.retrieval.threshold,
    );

    let mut tools = ToolRegistry::new();
    match &config.search.api_key {
        Some(key) => {
            let client = WebSearchClient::new(
                key,
                config.property.locality.clone(),
                config.search.max_results as u32,
            )?
            .with_base_url(config.search.base_url.clone());
            tools.register(Box::new(WebSearchTool::new(client)));
        }
        None => warn!("no search API key configured; the web-search tool is disabled"),
    }

    let notifier: Arc<dyn Notifier> = match (
        &config.notify.account_sid,
        &config.notify.auth_token,
        &config.notify.from_number,
        &config.notify.to_number,
    ) {
        (Some(sid), Some(token), Some(from), Some(to)) => {
            Arc::new(WhatsAppNotifier::new(sid, token, from, to)?)
        }
        _ => {
            warn!("notification gateway not configured; handoff requests will fail");
            Arc::new(NoopNotifier)
        }
    };

    let settings = EngineSettings {
        model: config.provider.model.clone(),
        temperature: config.provider.temperature,
        max_tokens: config.provider.max_tokens,
        max_tool_rounds: config.engine.max_tool_rounds,
        turn_timeout: Duration::from_secs(config.engine.turn_timeout_secs),
        history_window: config.engine.history_window,
    };

    let engine = ChatEngine::new(
        provider,
        retrieval,
        sessions,
        tools,
        PromptAssembler::new(config.property.name.clone(), config.property.locality.clone()),
        settings,
    );

    let state = Arc::new(GatewayState {
        engine: Arc::new(engine),
        notifier,
    });

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        model = %config.provider.model,
        "innkeep serving"
    );
    innkeep_gateway::serve(
        state,
        &config.gateway.host,
        config.gateway.port,
        config.gateway.allowed_origin.as_deref(),
    )
    .await?;

    Ok(())
}
