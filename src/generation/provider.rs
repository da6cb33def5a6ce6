use async_trait::async_trait;

use crate::core::errors::ApiError;

/// Produces free text from a prompt.
///
/// Used by the resolution pipeline as the last-resort strategy; the
/// backend is selected once at startup from configuration.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// return the provider name (e.g. "anthropic", "ollama")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// completion for a single prompt (non-streaming)
    async fn generate(&self, prompt: &str) -> Result<String, ApiError>;
}
