pub mod anthropic;
pub mod ollama;
pub mod provider;

pub use anthropic::AnthropicGenerator;
pub use ollama::OllamaGenerator;
pub use provider::GenerationProvider;
