//! PDS STAC Catalog - Extent cache, item search and the catalog entry point.
//!
//! [`CatalogFacade`] is what the routing layer talks to. It answers every
//! read operation against an [`IndexBackend`](pds_stac_core::IndexBackend)
//! and refuses every write.

pub mod extent;
pub mod facade;
pub mod search;

#[cfg(test)]
mod testing;

pub use extent::CollectionExtentCache;
pub use facade::CatalogFacade;
pub use search::SearchExecutor;
