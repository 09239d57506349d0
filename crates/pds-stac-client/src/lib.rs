//! PDS STAC Client - HTTP access to the registry index
//!
//! This crate provides [`OpenSearchClient`], the production implementation of
//! [`pds_stac_core::IndexBackend`]. It speaks the OpenSearch REST API
//! (`_search`, `_count`, `_doc`) with optional basic authentication.

pub mod opensearch;

pub use opensearch::OpenSearchClient;
