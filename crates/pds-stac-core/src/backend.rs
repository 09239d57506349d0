//! Seam between the catalog and the document-search index.
//!
//! Query bodies are plain OpenSearch DSL (`serde_json::Value`); responses are
//! decoded into the small subset of the OpenSearch response shape the
//! catalog reads.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::record::DomainRecord;

/// Relation of a reported hit total to the true total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalRelation {
    /// The total is exact.
    Eq,
    /// The total is a lower bound.
    Gte,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    pub relation: TotalRelation,
}

impl TotalHits {
    /// The total when it is exact.
    pub fn exact(&self) -> Option<u64> {
        (self.relation == TotalRelation::Eq).then_some(self.value)
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
    /// Sort values of the hit; present on sorted searches.
    #[serde(default)]
    pub sort: Option<Vec<Value>>,
}

impl Hit {
    pub fn into_record(self) -> DomainRecord {
        DomainRecord::new(self.id, self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Response of a `_search` request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,
    /// Raw aggregation results, keyed by aggregation name.
    #[serde(default)]
    pub aggregations: Option<Map<String, Value>>,
}

/// Response of a `_count` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Read access to the registry index.
///
/// Implementations report a missing index or document target as
/// `AppError::NotFound` on `search`/`count`, and unreachable or failing
/// engines as `AppError::BackendUnavailable`. They never retry.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Runs a `_search` request with the given body.
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, AppError>;

    /// Runs a `_count` request with the given body.
    async fn count(&self, index: &str, body: &Value) -> Result<u64, AppError>;

    /// Fetches one document by id, `None` if it does not exist.
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<DomainRecord>, AppError>;
}
