use async_trait::async_trait;

use crate::core::errors::ApiError;

/// Converts text into a fixed-dimension vector.
///
/// The backend is selected once at startup from configuration; callers
/// only ever see this trait.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// return the provider name (e.g. "openai", "ollama")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}
