//! RDF Graph Server - Binary Entry Point

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rdf_graph::chat::OpenAiClient;
use rdf_graph::{create_router, AppState, Config, KnowledgeGraphManager, RdfResult};

#[tokio::main]
async fn main() -> RdfResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rdf_graph=info,rdf_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(version = rdf_graph::VERSION, "Starting RDF graph server");

    let manager = Arc::new(KnowledgeGraphManager::with_file(&config.memory_file_path));

    let completion = Arc::new(OpenAiClient::new(&config.chat)?);
    if config.chat.api_key.is_none() {
        info!("CHAT_API_KEY not set, /chat requests go out unauthenticated");
    }

    let address = config.bind_address();
    let state = Arc::new(AppState::new(manager, completion, config));
    let app = create_router(state);

    let listener = TcpListener::bind(address.as_str()).await?;
    info!(address = %address, "Visualizer listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
