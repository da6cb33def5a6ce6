//! Domain model for vehicle battery specifications.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// Where a resolved specification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Database,
    Llm,
}

/// Battery specification for one vehicle.
///
/// (make, model, year) is the identity key, case-insensitive on make and
/// model. `confidence` and `source` are provenance, not identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatterySpec {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub capacity_kwh: f64,
    pub power_kw: f64,
    pub chemistry: String,
    pub confidence: f32,
    pub source: Source,
}

/// A resolution query key.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecQuery {
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl SpecQuery {
    pub fn new(make: &str, model: &str, year: i32) -> Self {
        Self {
            make: make.to_string(),
            model: model.to_string(),
            year,
        }
    }

    /// Reject malformed input before any collaborator is contacted.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.make.trim().is_empty() {
            return Err(ApiError::BadRequest("make must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ApiError::BadRequest("model must not be empty".to_string()));
        }
        if self.year <= 0 {
            return Err(ApiError::BadRequest(format!("invalid year: {}", self.year)));
        }
        Ok(())
    }

    /// Canonical text embedded for this key.
    ///
    /// The same construction is used when seeding records and when
    /// searching; stored and query vectors must come from identical
    /// text or similarity scores are meaningless.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} battery specifications",
            self.make, self.model, self.year
        )
    }
}

impl fmt::Display for SpecQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}
