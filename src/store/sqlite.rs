//! SQLite-backed knowledge store.
//!
//! Embeddings are stored as little-endian f32 blobs and ranked with
//! brute-force cosine similarity on read. Identity columns use NOCASE
//! collation, so "Tesla" and "tesla" address the same row.

use std::cmp::Ordering;
use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::spec_store::{SpecSearchResult, SpecStore};
use crate::core::config::AppPaths;
use crate::core::errors::ApiError;
use crate::spec::{BatterySpec, Source};

pub struct SqliteSpecStore {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteSpecStore {
    pub async fn new(paths: &AppPaths) -> Result<Self, ApiError> {
        Self::with_path(paths.db_path.clone()).await
    }

    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::store)?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS battery_specs (
                make TEXT NOT NULL COLLATE NOCASE,
                model TEXT NOT NULL COLLATE NOCASE,
                year INTEGER NOT NULL,
                capacity_kwh REAL NOT NULL,
                power_kw REAL NOT NULL,
                chemistry TEXT NOT NULL DEFAULT '',
                embedding BLOB,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (make, model, year)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::store)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_spec(row: &sqlx::sqlite::SqliteRow, confidence: f32) -> BatterySpec {
        BatterySpec {
            make: row.get("make"),
            model: row.get("model"),
            year: row.get("year"),
            capacity_kwh: row.get("capacity_kwh"),
            power_kw: row.get("power_kw"),
            chemistry: row.get("chemistry"),
            confidence,
            source: Source::Database,
        }
    }
}

#[async_trait]
impl SpecStore for SqliteSpecStore {
    async fn find_exact(
        &self,
        make: &str,
        model: &str,
        year: i32,
    ) -> Result<Option<BatterySpec>, ApiError> {
        let row = sqlx::query(
            "SELECT make, model, year, capacity_kwh, power_kw, chemistry
             FROM battery_specs
             WHERE make = ?1 AND model = ?2 AND year = ?3",
        )
        .bind(make)
        .bind(model)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::store)?;

        Ok(row.as_ref().map(|row| Self::row_to_spec(row, 1.0)))
    }

    async fn find_nearest(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SpecSearchResult>, ApiError> {
        let rows = sqlx::query(
            "SELECT make, model, year, capacity_kwh, power_kw, chemistry, embedding
             FROM battery_specs
             WHERE embedding IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::store)?;

        let mut scored: Vec<SpecSearchResult> = rows
            .iter()
            .map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let score = Self::cosine_similarity(query_embedding, &stored);

                SpecSearchResult {
                    spec: Self::row_to_spec(row, score),
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k.max(1));

        Ok(scored)
    }

    async fn upsert(&self, spec: &BatterySpec, embedding: &[f32]) -> Result<(), ApiError> {
        let blob = if embedding.is_empty() {
            None
        } else {
            Some(Self::serialize_embedding(embedding))
        };

        sqlx::query(
            "INSERT INTO battery_specs (make, model, year, capacity_kwh, power_kw, chemistry, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (make, model, year) DO UPDATE SET
                 capacity_kwh = excluded.capacity_kwh,
                 power_kw = excluded.power_kw,
                 chemistry = excluded.chemistry,
                 embedding = excluded.embedding,
                 updated_at = STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(&spec.make)
        .bind(&spec.model)
        .bind(spec.year)
        .bind(spec.capacity_kwh)
        .bind(spec.power_kw)
        .bind(&spec.chemistry)
        .bind(blob)
        .execute(&self.pool)
        .await
        .map_err(ApiError::store)?;

        Ok(())
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM battery_specs")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::store)?;

        Ok(count as usize)
    }
}
