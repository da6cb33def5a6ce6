use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{AppConfig, AppPaths, EmbeddingBackend, GenerationBackend};
use crate::embedding::{EmbeddingProvider, OllamaEmbeddings, OpenAiEmbeddings};
use crate::generation::{AnthropicGenerator, GenerationProvider, OllamaGenerator};
use crate::oracle::SpecOracle;
use crate::store::{SpecStore, SqliteSpecStore};

#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub store: Arc<dyn SpecStore>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn GenerationProvider>,
    pub oracle: SpecOracle,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub async fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let config = AppConfig::from_env()?;

        let store: Arc<dyn SpecStore> = Arc::new(SqliteSpecStore::new(&paths).await?);
        let embedder = build_embedder(&config);
        let generator = build_generator(&config);

        let oracle = SpecOracle::new(
            store.clone(),
            embedder.clone(),
            generator.clone(),
            config.confidence_threshold,
            config.llm_confidence,
        );
        let started_at = Utc::now();

        Ok(Arc::new(AppState {
            paths,
            config,
            store,
            embedder,
            generator,
            oracle,
            started_at,
        }))
    }
}

// Backend selection happens once here; the rest of the crate only sees
// the provider traits.
fn build_embedder(config: &AppConfig) -> Arc<dyn EmbeddingProvider> {
    match config.embedding_provider {
        EmbeddingBackend::OpenAi => Arc::new(OpenAiEmbeddings::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone().unwrap_or_default(),
        )),
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbeddings::new(
            config.ollama_url.clone(),
            config.ollama_embed_model.clone(),
        )),
    }
}

fn build_generator(config: &AppConfig) -> Arc<dyn GenerationProvider> {
    match config.generation_provider {
        GenerationBackend::Anthropic => Arc::new(AnthropicGenerator::new(
            config.anthropic_base_url.clone(),
            config.anthropic_api_key.clone().unwrap_or_default(),
        )),
        GenerationBackend::Ollama => Arc::new(OllamaGenerator::new(
            config.ollama_url.clone(),
            config.ollama_llm_model.clone(),
        )),
    }
}
