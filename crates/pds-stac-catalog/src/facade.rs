//! Read-only STAC catalog over the registry index.

use std::sync::Arc;

use pds_stac_core::backend::IndexBackend;
use pds_stac_core::config::CatalogConfig;
use pds_stac_core::error::AppError;
use pds_stac_core::models::{Collection, CollectionExtent, Item, ItemPage, SearchRequest};
use pds_stac_core::record::{DomainRecord, PRODUCT_COLLECTION, PRODUCT_OBSERVATIONAL};
use pds_stac_core::translate::{to_collection, to_item};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::extent::CollectionExtentCache;
use crate::search::SearchExecutor;

/// Entry point used by the routing layer.
///
/// Holds the index backend, the extent cache built at startup and the
/// search executor. Cloning is cheap; all state is shared.
#[derive(Clone)]
pub struct CatalogFacade {
    backend: Arc<dyn IndexBackend>,
    extents: Arc<CollectionExtentCache>,
    executor: SearchExecutor,
    config: Arc<CatalogConfig>,
}

impl CatalogFacade {
    pub fn new(
        backend: Arc<dyn IndexBackend>,
        extents: Arc<CollectionExtentCache>,
        config: Arc<CatalogConfig>,
    ) -> Self {
        let executor = SearchExecutor::new(backend.clone(), config.clone());
        Self {
            backend,
            extents,
            executor,
            config,
        }
    }

    /// Builds the extent cache, then the facade.
    ///
    /// # Errors
    ///
    /// Any failure of the extent aggregation. The catalog cannot serve
    /// requests without the cache, so callers should abort startup.
    pub async fn initialize(
        backend: Arc<dyn IndexBackend>,
        config: Arc<CatalogConfig>,
    ) -> Result<Self, AppError> {
        let extents = CollectionExtentCache::build(backend.as_ref(), &config).await?;
        info!("Catalog ready with {} known collections", extents.len());
        Ok(Self::new(backend, Arc::new(extents), config))
    }

    /// Every collection that has a cached extent.
    ///
    /// One `ids` query fetches all of them; the order follows the index.
    pub async fn list_collections(&self) -> Result<Vec<Collection>, AppError> {
        let ids = self.extents.list_known_collection_ids();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "query": { "ids": { "values": ids } },
            "size": ids.len(),
        });
        debug!(collections = ids.len(), "Listing collections");

        let response = self.backend.search(&self.config.index_name, &body).await?;
        Ok(response
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let record = hit.into_record();
                let extent = self.extents.lookup(record.doc_id());
                to_collection(&record, extent, &self.config)
            })
            .collect())
    }

    /// # Errors
    ///
    /// `AppError::NotFound` when no document has this id or the document is
    /// not a collection.
    pub async fn get_collection(&self, collection_id: &str) -> Result<Collection, AppError> {
        let record = self
            .fetch(collection_id)
            .await?
            .filter(|r| r.is_product_class(PRODUCT_COLLECTION))
            .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", collection_id)))?;

        Ok(to_collection(
            &record,
            self.extents.lookup(collection_id),
            &self.config,
        ))
    }

    /// # Errors
    ///
    /// `AppError::ItemNotInCollection` when the item is missing, is not an
    /// observational product, or belongs to another collection; in the last
    /// case `found_in` names the owner.
    pub async fn get_item(&self, collection_id: &str, item_id: &str) -> Result<Item, AppError> {
        let not_in_collection = |found_in: Option<&str>| AppError::ItemNotInCollection {
            item_id: item_id.to_string(),
            collection_id: collection_id.to_string(),
            found_in: found_in.map(str::to_string),
        };

        let record = self
            .fetch(item_id)
            .await?
            .filter(|r| r.is_product_class(PRODUCT_OBSERVATIONAL))
            .ok_or_else(|| not_in_collection(None))?;

        match record.parent_collection() {
            Some(parent) if parent == collection_id => Ok(to_item(&record, &self.config)),
            owner => Err(not_in_collection(owner)),
        }
    }

    pub async fn search_items(&self, request: &SearchRequest) -> Result<ItemPage, AppError> {
        self.executor.search(request).await
    }

    pub fn known_collection_ids(&self) -> Vec<&str> {
        self.extents.list_known_collection_ids()
    }

    pub fn extent(&self, collection_id: &str) -> Option<&CollectionExtent> {
        self.extents.lookup(collection_id)
    }

    async fn fetch(&self, id: &str) -> Result<Option<DomainRecord>, AppError> {
        self.backend.get_document(&self.config.index_name, id).await
    }

    // The registry is maintained by the harvest pipeline; the catalog never writes.

    pub fn create_item(&self, _collection_id: &str, _item: &Value) -> Result<Item, AppError> {
        Err(AppError::NotImplemented("create_item"))
    }

    pub fn patch_item(&self, _collection_id: &str, _item_id: &str, _patch: &Value) -> Result<Item, AppError> {
        Err(AppError::NotImplemented("patch_item"))
    }

    pub fn delete_item(&self, _collection_id: &str, _item_id: &str) -> Result<(), AppError> {
        Err(AppError::NotImplemented("delete_item"))
    }

    pub fn create_collection(&self, _collection: &Value) -> Result<Collection, AppError> {
        Err(AppError::NotImplemented("create_collection"))
    }

    pub fn patch_collection(&self, _collection_id: &str, _patch: &Value) -> Result<Collection, AppError> {
        Err(AppError::NotImplemented("patch_collection"))
    }

    pub fn delete_collection(&self, _collection_id: &str) -> Result<(), AppError> {
        Err(AppError::NotImplemented("delete_collection"))
    }

    pub fn get_items_mapping(&self, _collection_id: &str) -> Result<Value, AppError> {
        Err(AppError::NotImplemented("get_items_mapping"))
    }

    pub fn get_unique_field_values(&self, _collection_id: &str, _field: &str) -> Result<Vec<Value>, AppError> {
        Err(AppError::NotImplemented("get_unique_field_values"))
    }
}
