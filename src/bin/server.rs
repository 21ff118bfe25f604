//! Server binary: wires providers together and starts the HTTP listener

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use corpus_rag::config::{AppConfig, RuntimeSettings};
use corpus_rag::providers::ollama::{OllamaClient, OllamaEmbedder, OllamaLlm, EMBED_TIMEOUT};
use corpus_rag::providers::qdrant::QdrantStore;
use corpus_rag::providers::vector_store::VectorStoreProvider;
use corpus_rag::server::state::AppState;
use corpus_rag::server::RagServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corpus_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let settings = RuntimeSettings::from_env();

    tracing::info!(
        ollama = %config.ollama_base_url,
        qdrant = %config.qdrant_url,
        collection = %config.collection,
        embed_model = %config.embed_model,
        generate_model = %config.generate_model,
        "starting up"
    );

    let ollama = Arc::new(OllamaClient::new(config.ollama_base_url.clone()));
    if !ollama.is_reachable().await {
        tracing::warn!(
            url = %config.ollama_base_url,
            "embedding service not reachable yet"
        );
    }

    // The collection dimensionality is fixed by this probe; a mismatch with
    // an existing collection aborts startup.
    let probe = ollama
        .embed(&config.embed_model, "dimension probe", EMBED_TIMEOUT)
        .await
        .context("dimension probe failed")?;
    let dimension = probe.len();
    tracing::info!(dimension, "embedding dimension probed");

    let store = Arc::new(QdrantStore::new(
        config.qdrant_url.clone(),
        config.collection.clone(),
    ));
    store
        .ensure_collection(dimension)
        .await
        .context("collection setup failed")?;

    let embedder = Arc::new(OllamaEmbedder::new(
        ollama.clone(),
        config.embed_model.clone(),
        dimension,
    ));
    let llm = Arc::new(OllamaLlm::new(ollama, config.generate_model.clone()));

    let state = AppState::new(config, settings, embedder, store, llm);
    RagServer::new(state).run().await?;
    Ok(())
}
