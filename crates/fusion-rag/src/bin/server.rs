//! RAG server binary
//!
//! Run with: cargo run -p fusion-rag --bin fusion-rag-server

use std::path::PathBuf;

use fusion_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fusion_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (FUSION_RAG_CONFIG points at a TOML file)
    let config_path = std::env::var("FUSION_RAG_CONFIG").ok().map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Namespace: {}", config.index.namespace);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - LLM model: {}", config.llm.model);

    if config.index.dense_host.is_empty() || config.index.sparse_host.is_empty() {
        tracing::warn!("Index hosts are not configured");
        tracing::warn!("Set DENSE_INDEX_HOST and SPARSE_INDEX_HOST (and PINECONE_API_KEY),");
        tracing::warn!("or add them under [index] in the config file");
    }

    // Create the server, then probe the external collaborators
    let server = RagServer::new(config)?;

    for index in [server.state().dense_index(), server.state().sparse_index()] {
        match index.health_check().await {
            Ok(true) => tracing::info!("{} index is reachable", index.name()),
            _ => tracing::warn!("{} index is not reachable", index.name()),
        }
    }
    let chat = server.state().chat_model();
    match chat.health_check().await {
        Ok(true) => tracing::info!("Chat model '{}' is reachable", chat.model()),
        _ => tracing::warn!(
            "Chat model endpoint is not reachable; check OPENAI_API_KEY and [llm] config"
        ),
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload             - Upload documents");
    println!("  POST /api/query              - Ask questions");
    println!("  GET  /api/supported-formats  - List supported file types");
    println!("  GET  /api/documents          - List ingested documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
