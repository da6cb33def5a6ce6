//! Three-tier resolution pipeline.
//!
//! Strategies run in strict order and short-circuit on the first usable
//! result: exact key lookup, nearest-neighbour search gated by a
//! confidence threshold, then generative fallback. A miss at one tier
//! is control flow; a collaborator failure at any tier aborts the whole
//! resolution.

use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::embedding::EmbeddingProvider;
use crate::generation::GenerationProvider;
use crate::oracle::parser::parse_spec_response;
use crate::spec::{BatterySpec, SpecQuery};
use crate::store::SpecStore;

#[derive(Clone)]
pub struct SpecOracle {
    store: Arc<dyn SpecStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    confidence_threshold: f32,
    llm_confidence: f32,
}

impl SpecOracle {
    pub fn new(
        store: Arc<dyn SpecStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        confidence_threshold: f32,
        llm_confidence: f32,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            confidence_threshold,
            llm_confidence,
        }
    }

    /// Resolve a query to exactly one specification.
    pub async fn resolve(&self, query: &SpecQuery) -> Result<BatterySpec, ApiError> {
        query.validate()?;

        // Cheapest path first: no embedding or generation call is made
        // when the key is already stored.
        if let Some(spec) = self
            .store
            .find_exact(&query.make, &query.model, query.year)
            .await?
        {
            tracing::debug!("exact match for {}", query);
            return Ok(spec);
        }

        let vector = self.embedder.embed(&query.embedding_text()).await?;
        let nearest = self.store.find_nearest(&vector, 1).await?;

        if let Some(best) = nearest.first() {
            // >= keeps a result sitting exactly at the threshold.
            if best.score >= self.confidence_threshold {
                tracing::debug!(score = best.score, "similarity match for {}", query);
                return Ok(best.spec.clone());
            }
            tracing::debug!(
                score = best.score,
                threshold = self.confidence_threshold,
                "similarity below threshold for {}, falling back",
                query
            );
        }

        let prompt = fallback_prompt(query);
        let text = self.generator.generate(&prompt).await?;
        parse_spec_response(&text, query, self.llm_confidence)
    }
}

fn fallback_prompt(query: &SpecQuery) -> String {
    format!(
        "Please provide the battery specifications for the {} {} {} electric vehicle.\n\n\
         Return ONLY the following information in this exact format:\n\
         Capacity: [number] kWh\n\
         Power: [number] kW\n\
         Chemistry: [chemistry type]\n\n\
         If you don't have exact information, provide your best estimate based on similar \
         models and clearly indicate it's an estimate.",
        query.year, query.make, query.model
    )
}
