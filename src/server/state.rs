//! Shared application state

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{AppConfig, RuntimeSettings};
use crate::ingestion::{IngestPipeline, UrlFetcher};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::graph::GraphClient;
use crate::providers::llm::LlmProvider;
use crate::providers::vector_store::VectorStoreProvider;
use crate::retrieval::AnswerEngine;

struct AppStateInner {
    config: AppConfig,
    settings: RwLock<RuntimeSettings>,
    pipeline: IngestPipeline,
    answers: AnswerEngine,
    fetcher: UrlFetcher,
    graph: GraphClient,
}

/// Cheaply cloneable handle to everything the routes need
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        settings: RuntimeSettings,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let graph = GraphClient::new(config.graph_base.clone());
        Self {
            inner: Arc::new(AppStateInner {
                pipeline: IngestPipeline::new(embedder.clone(), store.clone()),
                answers: AnswerEngine::new(embedder, store, llm),
                fetcher: UrlFetcher::new(),
                settings: RwLock::new(settings),
                graph,
                config,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// One consistent copy of the tunables for the duration of a request
    pub fn settings_snapshot(&self) -> RuntimeSettings {
        self.inner.settings.read().clone()
    }

    /// Atomically replace the tunables
    pub fn replace_settings(&self, next: RuntimeSettings) {
        *self.inner.settings.write() = next;
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    pub fn answers(&self) -> &AnswerEngine {
        &self.inner.answers
    }

    pub fn fetcher(&self) -> &UrlFetcher {
        &self.inner.fetcher
    }

    pub fn graph(&self) -> &GraphClient {
        &self.inner.graph
    }
}
