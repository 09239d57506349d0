//! PDS STAC Core - Domain types, translation, error handling, and configuration.

pub mod backend;
pub mod config;
pub mod cursor;
pub mod error;
pub mod models;
pub mod record;
pub mod translate;

pub use backend::{CountResponse, Hit, Hits, IndexBackend, SearchResponse, TotalHits, TotalRelation};
pub use config::{default_config_path, load_settings, CatalogConfig, OpenSearchConfig, Settings};
pub use error::AppError;
pub use models::{
    Asset, Assets, Collection, CollectionExtent, Direction, Extent, Item, ItemPage,
    ItemProperties, Link, Provider, SearchRequest, SortField, SpatialExtent, TemporalExtent,
};
pub use record::{DomainRecord, PRODUCT_COLLECTION, PRODUCT_OBSERVATIONAL};
pub use translate::{to_collection, to_item};
