//! Environment-backed application configuration.
//!
//! All settings are read once at startup into an explicit struct and
//! validated with enumerated required-field checks. A `.env` file in the
//! working directory is honored if present.

use std::env;

use crate::core::errors::ApiError;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.8;
pub const DEFAULT_LLM_CONFIDENCE: f32 = 0.5;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_OLLAMA_LLM_MODEL: &str = "gemma3";

/// Which embedding backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    OpenAi,
    Ollama,
}

impl EmbeddingBackend {
    fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ApiError::BadRequest(format!(
                "unknown EMBEDDING_PROVIDER '{}': expected 'openai' or 'ollama'",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

/// Which generation backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationBackend {
    Anthropic,
    Ollama,
}

impl GenerationBackend {
    fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw.to_ascii_lowercase().as_str() {
            // "claude" kept as an accepted spelling for existing deployments
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ApiError::BadRequest(format!(
                "unknown LLM_PROVIDER '{}': expected 'anthropic' or 'ollama'",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub embedding_provider: EmbeddingBackend,
    pub generation_provider: GenerationBackend,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub ollama_url: String,
    pub ollama_embed_model: String,
    pub ollama_llm_model: String,
    pub confidence_threshold: f32,
    pub llm_confidence: f32,
    pub embedding_dimension: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let embedding_provider = match get("EMBEDDING_PROVIDER") {
            Some(raw) => EmbeddingBackend::parse(&raw)?,
            None => EmbeddingBackend::OpenAi,
        };
        let generation_provider = match get("LLM_PROVIDER") {
            Some(raw) => GenerationBackend::parse(&raw)?,
            None => GenerationBackend::Ollama,
        };

        let openai_api_key = get("OPENAI_API_KEY");
        let anthropic_api_key = get("ANTHROPIC_API_KEY");

        let confidence_threshold = parse_unit_interval(
            get("CONFIDENCE_THRESHOLD"),
            "CONFIDENCE_THRESHOLD",
            DEFAULT_CONFIDENCE_THRESHOLD,
        )?;
        let llm_confidence = parse_unit_interval(
            get("LLM_CONFIDENCE"),
            "LLM_CONFIDENCE",
            DEFAULT_LLM_CONFIDENCE,
        )?;

        let embedding_dimension = match get("EMBEDDING_DIMENSION") {
            Some(raw) => raw.parse::<usize>().ok().filter(|dim| *dim > 0).ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "EMBEDDING_DIMENSION must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_EMBEDDING_DIMENSION,
        };

        let config = AppConfig {
            embedding_provider,
            generation_provider,
            openai_api_key,
            anthropic_api_key,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            anthropic_base_url: get("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ollama_embed_model: get("OLLAMA_EMBED_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_EMBED_MODEL.to_string()),
            ollama_llm_model: get("OLLAMA_LLM_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_LLM_MODEL.to_string()),
            confidence_threshold,
            llm_confidence,
            embedding_dimension,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.embedding_provider == EmbeddingBackend::OpenAi && self.openai_api_key.is_none() {
            return Err(ApiError::BadRequest(
                "OPENAI_API_KEY is required when EMBEDDING_PROVIDER is 'openai'".to_string(),
            ));
        }
        if self.generation_provider == GenerationBackend::Anthropic
            && self.anthropic_api_key.is_none()
        {
            return Err(ApiError::BadRequest(
                "ANTHROPIC_API_KEY is required when LLM_PROVIDER is 'anthropic'".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_unit_interval(
    raw: Option<String>,
    key: &str,
    default: f32,
) -> Result<f32, ApiError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value = raw.parse::<f32>().map_err(|_| {
        ApiError::BadRequest(format!("{} must be a number, got '{}'", key, raw))
    })?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ApiError::BadRequest(format!(
            "{} must be within [0, 1], got {}",
            key, value
        )));
    }

    Ok(value)
}
