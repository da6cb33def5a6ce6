use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::embedding::EmbeddingProvider;
use crate::generation::GenerationProvider;
use crate::oracle::SpecOracle;
use crate::spec::{BatterySpec, Source, SpecQuery};
use crate::store::{SpecSearchResult, SpecStore};

struct FakeStore {
    exact: Option<BatterySpec>,
    nearest: Vec<SpecSearchResult>,
    exact_calls: AtomicUsize,
    nearest_calls: AtomicUsize,
}

impl FakeStore {
    fn empty() -> Self {
        Self {
            exact: None,
            nearest: Vec::new(),
            exact_calls: AtomicUsize::new(0),
            nearest_calls: AtomicUsize::new(0),
        }
    }

    fn with_exact(spec: BatterySpec) -> Self {
        Self {
            exact: Some(spec),
            ..Self::empty()
        }
    }

    fn with_nearest(results: Vec<SpecSearchResult>) -> Self {
        Self {
            nearest: results,
            ..Self::empty()
        }
    }
}

#[async_trait]
impl SpecStore for FakeStore {
    async fn find_exact(
        &self,
        _make: &str,
        _model: &str,
        _year: i32,
    ) -> Result<Option<BatterySpec>, ApiError> {
        self.exact_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.exact.clone())
    }

    async fn find_nearest(
        &self,
        _query_embedding: &[f32],
        _k: usize,
    ) -> Result<Vec<SpecSearchResult>, ApiError> {
        self.nearest_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.nearest.clone())
    }

    async fn upsert(&self, _spec: &BatterySpec, _embedding: &[f32]) -> Result<(), ApiError> {
        Ok(())
    }

    async fn count(&self) -> Result<usize, ApiError> {
        Ok(usize::from(self.exact.is_some()) + self.nearest.len())
    }
}

struct FakeEmbedder {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeEmbedder {
    fn healthy() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn unreachable() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn name(&self) -> &str {
        "fake-embedder"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(!self.fail)
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApiError::Embedding("embedding service down".to_string()));
        }
        Ok(vec![1.0, 0.0, 0.0])
    }
}

struct FakeGenerator {
    calls: AtomicUsize,
    response: String,
}

impl FakeGenerator {
    fn replying(response: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: response.to_string(),
        }
    }
}

#[async_trait]
impl GenerationProvider for FakeGenerator {
    fn name(&self) -> &str {
        "fake-generator"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

fn oracle(
    store: Arc<FakeStore>,
    embedder: Arc<FakeEmbedder>,
    generator: Arc<FakeGenerator>,
) -> SpecOracle {
    SpecOracle::new(store, embedder, generator, 0.8, 0.5)
}

fn seeded_spec() -> BatterySpec {
    BatterySpec {
        make: "Tesla".to_string(),
        model: "Model 3".to_string(),
        year: 2023,
        capacity_kwh: 75.0,
        power_kw: 283.0,
        chemistry: "NMC".to_string(),
        confidence: 1.0,
        source: Source::Database,
    }
}

fn near_result(score: f32) -> SpecSearchResult {
    let mut spec = seeded_spec();
    spec.confidence = score;
    SpecSearchResult { spec, score }
}

const FALLBACK_REPLY: &str = "Capacity: 135 kWh\nPower: 200 kW\nChemistry: NMC";

#[tokio::test]
async fn exact_match_short_circuits_without_other_collaborators() {
    let store = Arc::new(FakeStore::with_exact(seeded_spec()));
    let embedder = Arc::new(FakeEmbedder::healthy());
    let generator = Arc::new(FakeGenerator::replying(FALLBACK_REPLY));
    let oracle = oracle(store.clone(), embedder.clone(), generator.clone());

    let spec = oracle
        .resolve(&SpecQuery::new("Tesla", "Model 3", 2023))
        .await
        .unwrap();

    assert_eq!(spec.capacity_kwh, 75.0);
    assert_eq!(spec.power_kw, 283.0);
    assert_eq!(spec.chemistry, "NMC");
    assert_eq!(spec.confidence, 1.0);
    assert_eq!(spec.source, Source::Database);
    assert_eq!(store.exact_calls.load(Ordering::SeqCst), 1);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn similarity_result_at_threshold_is_accepted() {
    let store = Arc::new(FakeStore::with_nearest(vec![near_result(0.8)]));
    let embedder = Arc::new(FakeEmbedder::healthy());
    let generator = Arc::new(FakeGenerator::replying(FALLBACK_REPLY));
    let oracle = oracle(store.clone(), embedder.clone(), generator.clone());

    let spec = oracle
        .resolve(&SpecQuery::new("Tesla", "Model 3", 2024))
        .await
        .unwrap();

    assert_eq!(spec.source, Source::Database);
    assert_eq!(spec.confidence, 0.8);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn similarity_one_ulp_below_threshold_falls_back() {
    let just_below = f32::from_bits(0.8f32.to_bits() - 1);
    let store = Arc::new(FakeStore::with_nearest(vec![near_result(just_below)]));
    let embedder = Arc::new(FakeEmbedder::healthy());
    let generator = Arc::new(FakeGenerator::replying(FALLBACK_REPLY));
    let oracle = oracle(store.clone(), embedder.clone(), generator.clone());

    let spec = oracle
        .resolve(&SpecQuery::new("Tesla", "Model 3", 2024))
        .await
        .unwrap();

    assert_eq!(spec.source, Source::Llm);
    assert_eq!(spec.confidence, 0.5);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_store_resolves_through_generation() {
    let store = Arc::new(FakeStore::empty());
    let embedder = Arc::new(FakeEmbedder::healthy());
    let generator = Arc::new(FakeGenerator::replying(FALLBACK_REPLY));
    let oracle = oracle(store.clone(), embedder.clone(), generator.clone());

    let spec = oracle
        .resolve(&SpecQuery::new("Rivian", "R1T", 2023))
        .await
        .unwrap();

    assert_eq!(spec.make, "Rivian");
    assert_eq!(spec.model, "R1T");
    assert_eq!(spec.year, 2023);
    assert_eq!(spec.capacity_kwh, 135.0);
    assert_eq!(spec.power_kw, 200.0);
    assert_eq!(spec.chemistry, "NMC");
    assert_eq!(spec.confidence, 0.5);
    assert_eq!(spec.source, Source::Llm);
    assert_eq!(store.nearest_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn embedding_failure_aborts_instead_of_falling_back() {
    let store = Arc::new(FakeStore::empty());
    let embedder = Arc::new(FakeEmbedder::unreachable());
    let generator = Arc::new(FakeGenerator::replying(FALLBACK_REPLY));
    let oracle = oracle(store.clone(), embedder.clone(), generator.clone());

    let err = oracle
        .resolve(&SpecQuery::new("Rivian", "R1T", 2023))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Embedding(_)));
    assert_eq!(store.nearest_calls.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unparseable_generation_reply_is_terminal() {
    let store = Arc::new(FakeStore::empty());
    let embedder = Arc::new(FakeEmbedder::healthy());
    let generator = Arc::new(FakeGenerator::replying(
        "I'm sorry, I can't help with that.",
    ));
    let oracle = oracle(store.clone(), embedder.clone(), generator.clone());

    let err = oracle
        .resolve(&SpecQuery::new("Rivian", "R1T", 2023))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::UnparseableResponse(_)));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_collaborator() {
    let store = Arc::new(FakeStore::with_exact(seeded_spec()));
    let embedder = Arc::new(FakeEmbedder::healthy());
    let generator = Arc::new(FakeGenerator::replying(FALLBACK_REPLY));
    let oracle = oracle(store.clone(), embedder.clone(), generator.clone());

    let err = oracle
        .resolve(&SpecQuery::new("", "Model 3", 2023))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(store.exact_calls.load(Ordering::SeqCst), 0);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}
