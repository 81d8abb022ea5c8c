use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pdf_chat::providers::OllamaClient;
use pdf_chat::server::ChatServer;
use pdf_chat::ChatConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ChatConfig::load()?;

    info!("========================================");
    info!("  pdf-chat server v{}", env!("CARGO_PKG_VERSION"));
    info!("========================================");
    info!(
        host = %config.server.host,
        port = config.server.port,
        cors = config.server.enable_cors,
        "server"
    );
    info!(
        base_url = %config.llm.base_url,
        embed_model = %config.llm.embed_model,
        generate_model = %config.llm.generate_model,
        "ollama"
    );
    info!(
        max_chunk_size = config.chunking.max_chunk_size,
        overlap = config.chunking.overlap,
        top_k = config.retrieval.top_k,
        "pipeline"
    );

    let ollama = OllamaClient::new(&config.llm)?;
    if ollama.health_check().await? {
        info!("Ollama is reachable");
    } else {
        warn!(base_url = %config.llm.base_url, "Ollama is not reachable, requests will fail until it is up");
        warn!(
            "hint: start Ollama and run `ollama pull {}` and `ollama pull {}`",
            config.llm.embed_model, config.llm.generate_model
        );
    }

    let server = ChatServer::new(config)?;
    server.start().await?;
    Ok(())
}
