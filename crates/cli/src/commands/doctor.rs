//! `innkeep doctor` — Diagnose configuration and service health.

use super::{build_provider, load_config};
use innkeep_core::knowledge::KnowledgeStore;
use innkeep_core::Provider;
use innkeep_knowledge::SqliteKnowledgeStore;
use innkeep_session::SqliteSessionStore;
use std::path::Path;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    println!("🩺 Innkeep Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config = match load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid ({})", config_path.display());
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            return Ok(());
        }
    };

    // Model provider
    match build_provider(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Model provider reachable ({})", config.provider.model),
            Ok(false) | Err(_) => {
                println!("  ❌ Model provider unreachable — guest turns will fail");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    // Embeddings
    if config.embeddings.api_key.is_some() {
        println!("  ✅ Embedding API key configured");
    } else {
        println!("  ⚠️  No embedding API key — retrieval will return no context");
        issues += 1;
    }

    // Web search
    if config.search.api_key.is_some() {
        println!("  ✅ Search API key configured");
    } else {
        println!("  ⚠️  No search API key — the web-search tool is disabled");
        issues += 1;
    }

    // Notification gateway
    let notify = &config.notify;
    if notify.account_sid.is_some()
        && notify.auth_token.is_some()
        && notify.from_number.is_some()
        && notify.to_number.is_some()
    {
        println!("  ✅ Notification gateway configured");
    } else {
        println!("  ⚠️  Notification gateway incomplete — handoff requests will fail");
        issues += 1;
    }

    // Storage
    match SqliteKnowledgeStore::new(&config.storage.knowledge_path).await {
        Ok(store) => {
            let chunks = store.count().await.unwrap_or(0);
            if chunks == 0 {
                println!("  ⚠️  Knowledge store is empty — run `innkeep ingest <dir>`");
                issues += 1;
            } else {
                println!("  ✅ Knowledge store holds {chunks} chunk(s)");
            }
        }
        Err(e) => {
            println!("  ❌ Knowledge store unavailable: {e}");
            issues += 1;
        }
    }
    match SqliteSessionStore::new(&config.storage.sessions_path).await {
        Ok(_) => println!("  ✅ Session store available"),
        Err(e) => {
            println!("  ❌ Session store unavailable: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
