//! SpecStore trait — abstract interface for the battery-spec knowledge
//! store.
//!
//! The primary implementation is `SqliteSpecStore` in the `sqlite`
//! module.

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::spec::BatterySpec;

/// One hit from a nearest-neighbour search.
#[derive(Debug, Clone)]
pub struct SpecSearchResult {
    /// The stored record, with `confidence` set to the score below.
    pub spec: BatterySpec,
    /// Cosine similarity to the query vector (higher = closer).
    pub score: f32,
}

/// Abstract trait for knowledge-store backends.
#[async_trait]
pub trait SpecStore: Send + Sync {
    /// Exact lookup by identity key; case-insensitive on make and
    /// model, exact on year. A hit carries confidence 1.0 and source
    /// `database`.
    async fn find_exact(
        &self,
        make: &str,
        model: &str,
        year: i32,
    ) -> Result<Option<BatterySpec>, ApiError>;

    /// The `k` nearest embedded records by descending cosine
    /// similarity. Records without an embedding are skipped; an empty
    /// store yields an empty vec.
    async fn find_nearest(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SpecSearchResult>, ApiError>;

    /// Insert or overwrite the record stored under the spec's identity
    /// key. Idempotent on the key.
    async fn upsert(&self, spec: &BatterySpec, embedding: &[f32]) -> Result<(), ApiError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<usize, ApiError>;
}
