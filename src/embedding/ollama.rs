use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::provider::EmbeddingProvider;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct OllamaEmbeddings {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaEmbeddings {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    // Ollama returns f64 arrays, one per input
    embeddings: Vec<Vec<f64>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self.client.get(&url).send().await;
        match res {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let url = format!("{}/api/embed", self.base_url);

        let body = json!({
            "model": self.model,
            "input": text,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Embedding(format!(
                "Ollama embed error (status {}): {}",
                status, text
            )));
        }

        let payload: OllamaEmbedResponse = res.json().await.map_err(ApiError::embedding)?;

        let first = payload
            .embeddings
            .into_iter()
            .next()
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| ApiError::Embedding("no embedding data in response".to_string()))?;

        Ok(first.into_iter().map(|v| v as f32).collect())
    }
}
