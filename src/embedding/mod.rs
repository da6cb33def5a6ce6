pub mod ollama;
pub mod openai;
pub mod provider;

pub use ollama::OllamaEmbeddings;
pub use openai::OpenAiEmbeddings;
pub use provider::EmbeddingProvider;
