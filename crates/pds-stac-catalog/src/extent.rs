//! Precomputed spatial extents of collections.
//!
//! The cache is built once, before the catalog answers any request, from a
//! single aggregation over every observational product that declares
//! bounding coordinates. It is never refreshed: collections ingested after
//! startup have no extent until the process restarts.

use std::collections::HashMap;

use pds_stac_core::backend::IndexBackend;
use pds_stac_core::config::CatalogConfig;
use pds_stac_core::error::AppError;
use pds_stac_core::models::CollectionExtent;
use pds_stac_core::record::{fields, PRODUCT_OBSERVATIONAL};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// Name of the per-collection terms aggregation.
pub const COLLECTIONS_AGGREGATION: &str = "unique_parent_collections";

#[derive(Deserialize, Debug)]
struct TermsAggregation {
    #[serde(default)]
    sum_other_doc_count: u64,
    buckets: Vec<ExtentBucket>,
}

#[derive(Deserialize, Debug)]
struct ExtentBucket {
    key: String,
    max_east_bound: MetricValue,
    min_west_bound: MetricValue,
    max_north_bound: MetricValue,
    min_south_bound: MetricValue,
}

#[derive(Deserialize, Debug)]
struct MetricValue {
    value: Option<f64>,
}

impl ExtentBucket {
    fn into_extent(self) -> Option<CollectionExtent> {
        Some(CollectionExtent {
            west_bound: self.min_west_bound.value?,
            east_bound: self.max_east_bound.value?,
            south_bound: self.min_south_bound.value?,
            north_bound: self.max_north_bound.value?,
            collection_id: self.key,
        })
    }
}

/// Read-only map of collection id → spatial extent.
///
/// # Examples
///
/// ```
/// use pds_stac_catalog::CollectionExtentCache;
/// use pds_stac_core::CollectionExtent;
///
/// let cache = CollectionExtentCache::from_extents([CollectionExtent {
///     collection_id: "urn:nasa:pds:c1::1.0".to_string(),
///     west_bound: 0.0,
///     east_bound: 10.0,
///     south_bound: -5.0,
///     north_bound: 5.0,
/// }]);
/// assert_eq!(cache.list_known_collection_ids(), vec!["urn:nasa:pds:c1::1.0"]);
/// assert!(cache.lookup("urn:nasa:pds:other::1.0").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectionExtentCache {
    extents: HashMap<String, CollectionExtent>,
}

impl CollectionExtentCache {
    /// Runs the extent aggregation and builds the cache.
    ///
    /// # Errors
    ///
    /// Propagates any backend failure; the caller treats it as fatal.
    pub async fn build<B>(backend: &B, config: &CatalogConfig) -> Result<Self, AppError>
    where
        B: IndexBackend + ?Sized,
    {
        info!("Building collection extent cache from index '{}'", config.index_name);

        let response = backend
            .search(&config.index_name, &Self::aggregation_query(config))
            .await?;

        let aggregations = response.aggregations.ok_or_else(|| {
            AppError::BackendUnavailable("extent query returned no aggregations".to_string())
        })?;

        let cache = Self::from_aggregations(&aggregations)?;
        info!("Cached spatial extents for {} collections", cache.len());
        Ok(cache)
    }

    /// Aggregation body: min/max bounding coordinates per parent collection.
    pub fn aggregation_query(config: &CatalogConfig) -> Value {
        json!({
            "size": 0,
            "query": {
                "bool": {
                    "filter": [
                        { "exists": { "field": fields::EAST_BOUND } },
                        { "term": { "product_class": PRODUCT_OBSERVATIONAL } }
                    ]
                }
            },
            "aggs": {
                COLLECTIONS_AGGREGATION: {
                    "terms": {
                        "field": fields::PARENT_COLLECTION,
                        "size": config.collection_bucket_size
                    },
                    "aggs": {
                        "max_east_bound": { "max": { "field": fields::EAST_BOUND } },
                        "min_west_bound": { "min": { "field": fields::WEST_BOUND } },
                        "max_north_bound": { "max": { "field": fields::NORTH_BOUND } },
                        "min_south_bound": { "min": { "field": fields::SOUTH_BOUND } }
                    }
                }
            }
        })
    }

    /// Parses the aggregation section of the extent query response.
    pub fn from_aggregations(aggregations: &Map<String, Value>) -> Result<Self, AppError> {
        let raw = aggregations.get(COLLECTIONS_AGGREGATION).ok_or_else(|| {
            AppError::BackendUnavailable(format!(
                "extent query returned no '{}' aggregation",
                COLLECTIONS_AGGREGATION
            ))
        })?;
        let terms = TermsAggregation::deserialize(raw)?;

        if terms.sum_other_doc_count > 0 {
            warn!(
                dropped_documents = terms.sum_other_doc_count,
                "Collection bucket cap reached; some collections have no cached extent"
            );
        }

        let mut extents = HashMap::with_capacity(terms.buckets.len());
        for bucket in terms.buckets {
            let key = bucket.key.clone();
            match bucket.into_extent() {
                Some(extent) => {
                    extents.insert(key, extent);
                }
                None => warn!(collection = %key, "Skipping collection with incomplete bounding coordinates"),
            }
        }

        Ok(Self { extents })
    }

    pub fn from_extents(extents: impl IntoIterator<Item = CollectionExtent>) -> Self {
        Self {
            extents: extents
                .into_iter()
                .map(|e| (e.collection_id.clone(), e))
                .collect(),
        }
    }

    /// Cached collection ids, sorted.
    pub fn list_known_collection_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.extents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Extent of a collection; `None` is a legitimate answer.
    pub fn lookup(&self, collection_id: &str) -> Option<&CollectionExtent> {
        self.extents.get(collection_id)
    }

    pub fn len(&self) -> usize {
        self.extents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }
}
