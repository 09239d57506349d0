use thiserror::Error;

/// Application-wide error types.
///
/// Every failure the catalog core can report to its caller. The external
/// routing layer maps these onto user-facing responses; nothing in this
/// workspace retries on its own.
///
/// # Error Conversion
///
/// - `serde_json::Error` → `AppError::SerializationError`
///
/// # Examples
///
/// ```
/// use pds_stac_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::NotFound("Collection urn:nasa:pds:x not found".to_string()))
/// }
///
/// assert!(example().unwrap_err().is_not_found());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// A collection, an item, or the collections targeted by a search do not exist.
    ///
    /// Raised when `_doc` finds no document, when the document has the wrong
    /// product class, or when a search targets an index that is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The item is missing, is not an observational product, or belongs to
    /// another collection than the one requested.
    ///
    /// `found_in` carries the collection that actually owns the item, when
    /// the record declares one.
    #[error(
        "Item {item_id} does not exist inside Collection {collection_id}{}",
        owner_suffix(.found_in)
    )]
    ItemNotInCollection {
        item_id: String,
        collection_id: String,
        found_in: Option<String>,
    },

    /// A pagination token could not be decoded.
    ///
    /// Occurs when a token is not URL-safe base64 or does not hold a JSON
    /// array of sort values, usually because it was edited or truncated.
    #[error("Invalid pagination token: {0}")]
    InvalidCursor(String),

    /// The operation is declared but not supported by this catalog.
    ///
    /// Write operations end up here. Callers must not retry.
    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),

    /// The index engine is unreachable or answered with an error.
    ///
    /// Covers connection failures, timeouts and non-2xx answers other than
    /// 404. This is the only variant callers may retry.
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Settings could not be read or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

fn owner_suffix(found_in: &Option<String>) -> String {
    found_in
        .as_ref()
        .map(|c| format!(" but was found in collection {}", c))
        .unwrap_or_default()
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::BackendUnavailable(msg) => {
                if msg.contains("connect") {
                    format!(
                        "Cannot reach the search index: {}\n   Is OpenSearch running? Check OPENSEARCH_URL.",
                        msg
                    )
                } else if msg.contains("401") || msg.contains("403") {
                    "The search index rejected the credentials.\n   Check OPENSEARCH_USERNAME and OPENSEARCH_PASSWORD.".to_string()
                } else {
                    format!("Search index error: {}", msg)
                }
            }
            AppError::InvalidCursor(_) => {
                "The pagination token is not valid.\n   Pass the token exactly as returned by the previous page.".to_string()
            }
            AppError::NotImplemented(op) => {
                format!("'{}' is not supported: this catalog is read-only.", op)
            }
            AppError::ConfigError(msg) => {
                format!("Invalid configuration: {}", msg)
            }
            _ => self.to_string(),
        }
    }

    /// Returns true for the not-found class of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::ItemNotInCollection { .. }
        )
    }

    /// Returns true if the caller may retry the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use pds_stac_core::error::AppError;
    ///
    /// let err = AppError::BackendUnavailable("connection refused".to_string());
    /// assert!(err.is_retryable());
    ///
    /// let err = AppError::NotImplemented("create_item");
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::BackendUnavailable(_))
    }
}
