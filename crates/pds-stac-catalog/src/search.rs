//! Item search with cursor pagination and concurrent match counting.

use std::sync::Arc;

use pds_stac_core::backend::{IndexBackend, SearchResponse};
use pds_stac_core::config::CatalogConfig;
use pds_stac_core::cursor;
use pds_stac_core::error::AppError;
use pds_stac_core::models::{ItemPage, SearchRequest, SortField};
use pds_stac_core::record::{fields, PRODUCT_OBSERVATIONAL};
use pds_stac_core::translate::to_item;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Runs item searches against the registry index.
///
/// Each search issues the page query and an exact `_count` over the same
/// filter at the same time. The count is best effort: if it fails, the
/// page's own total is reported when exact, otherwise the total is unknown.
#[derive(Clone)]
pub struct SearchExecutor {
    backend: Arc<dyn IndexBackend>,
    config: Arc<CatalogConfig>,
}

impl SearchExecutor {
    pub fn new(backend: Arc<dyn IndexBackend>, config: Arc<CatalogConfig>) -> Self {
        Self { backend, config }
    }

    /// Filter shared by the page and count queries.
    ///
    /// An empty collection list places no restriction, same as `None`.
    pub fn filter_query(collection_ids: Option<&[String]>) -> Value {
        let mut filters = vec![json!({ "term": { "product_class": PRODUCT_OBSERVATIONAL } })];
        if let Some(ids) = collection_ids.filter(|ids| !ids.is_empty()) {
            filters.push(json!({ "terms": { (fields::PARENT_COLLECTION): ids } }));
        }
        json!({ "bool": { "filter": filters } })
    }

    /// Page query: filter, sort, optional `search_after`, and page size.
    pub fn page_query(&self, filter: &Value, sort: &[SortField], search_after: Option<Vec<Value>>, size: usize) -> Value {
        let sort: Vec<Value> = if sort.is_empty() {
            vec![SortField::asc(self.config.default_sort.as_str()).to_query()]
        } else {
            sort.iter().map(SortField::to_query).collect()
        };

        let mut body = json!({
            "query": filter,
            "sort": sort,
            "size": size,
        });
        if let Some(after) = search_after.filter(|values| !values.is_empty()) {
            body["search_after"] = Value::Array(after);
        }
        body
    }

    /// Returns one page of items matching `request`.
    ///
    /// At most `request.limit` items are returned; one extra hit is fetched to
    /// tell whether a next page exists. A limit of 0 is treated as 1, and a
    /// blank token starts from the first page.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidCursor` if the token cannot be decoded
    /// - `AppError::NotFound` if the targeted collections do not exist in the index
    /// - any other failure of the page query, unmodified
    pub async fn search(&self, request: &SearchRequest) -> Result<ItemPage, AppError> {
        let limit = request.limit.max(1);
        let max_window = self.config.max_result_window;

        let search_after = request
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .map(cursor::decode)
            .transpose()?;

        let filter = Self::filter_query(request.collection_ids.as_deref());
        let size = (limit + 1).min(max_window);
        let page_body = self.page_query(
            &filter,
            request.sort.as_deref().unwrap_or_default(),
            search_after,
            size,
        );
        let count_body = json!({ "query": filter });

        debug!(limit, size, collections = ?request.collection_ids, "Searching collection items");

        let index = self.config.index_name.as_str();
        let (page, count) = tokio::join!(
            self.backend.search(index, &page_body),
            self.backend.count(index, &count_body),
        );

        let page = page.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound(format!(
                "Collections '{}' do not exist",
                request
                    .collection_ids
                    .as_deref()
                    .unwrap_or_default()
                    .join(", ")
            )),
            other => other,
        })?;

        let number_matched = match count {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(error = %e, "Count query failed; falling back to page total");
                page.hits.total.as_ref().and_then(|t| t.exact())
            }
        };

        let next_token = next_token(&page, limit, max_window);

        let items = page
            .hits
            .hits
            .into_iter()
            .take(limit)
            .map(|hit| to_item(&hit.into_record(), &self.config))
            .collect();

        Ok(ItemPage {
            items,
            number_matched,
            next_token,
        })
    }
}

/// Token resuming after the last retained hit, when more hits exist.
fn next_token(page: &SearchResponse, limit: usize, max_window: usize) -> Option<String> {
    let hits = &page.hits.hits;
    if hits.len() <= limit || limit >= max_window {
        return None;
    }
    hits.get(limit - 1)
        .and_then(|hit| hit.sort.as_deref())
        .map(cursor::encode)
}
