use async_trait::async_trait;
use pds_stac_core::backend::{CountResponse, IndexBackend, SearchResponse};
use pds_stac_core::config::OpenSearchConfig;
use pds_stac_core::error::AppError;
use pds_stac_core::record::DomainRecord;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

/// Document returned by the OpenSearch `_doc` API.
///
/// OpenSearch API reference: <https://opensearch.org/docs/latest/api-reference/document-apis/get-documents/>
#[derive(Deserialize, Debug)]
struct GetDocumentResponse {
    #[serde(rename = "_id")]
    id: String,
    found: bool,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

/// Error body returned by OpenSearch on non-2xx responses.
#[derive(Deserialize, Debug)]
struct OpenSearchErrorBody {
    error: OpenSearchErrorDetail,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OpenSearchErrorDetail {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        reason: Option<String>,
    },
    Plain(String),
}

impl OpenSearchErrorDetail {
    fn describe(&self) -> String {
        match self {
            Self::Structured { kind, reason } => match reason {
                Some(reason) => format!("{}: {}", kind, reason),
                None => kind.clone(),
            },
            Self::Plain(msg) => msg.clone(),
        }
    }
}

/// HTTP client for the registry's OpenSearch cluster.
///
/// Implements [`IndexBackend`] over the REST API. Requests are sent once;
/// failures surface to the caller, who owns any retry policy.
///
/// # Examples
///
/// ```no_run
/// use pds_stac_client::OpenSearchClient;
/// use pds_stac_core::{IndexBackend, OpenSearchConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenSearchClient::new(&OpenSearchConfig::default())?;
/// let count = client.count("registry", &serde_json::json!({})).await?;
/// println!("{} documents", count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenSearchClient {
    client: Client,
    base_url: Url,
    credentials: Option<(String, Option<String>)>,
    timeout_secs: u64,
}

impl OpenSearchClient {
    /// Creates a client for the cluster described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the cluster URL is malformed.
    /// Returns `AppError::BackendUnavailable` if the HTTP client cannot be built.
    pub fn new(config: &OpenSearchConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.url)
            .map_err(|_| AppError::InvalidUrl(format!("Invalid OpenSearch URL: {}", config.url)))?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        let credentials = config
            .username
            .clone()
            .map(|user| (user, config.password.clone()));

        Ok(Self {
            client,
            base_url,
            credentials,
            timeout_secs: config.timeout_secs,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::BackendUnavailable(format!(
                    "request timed out after {} seconds",
                    self.timeout_secs
                ))
            } else if e.is_connect() {
                AppError::BackendUnavailable(format!("Connection failed: {}", e))
            } else {
                AppError::BackendUnavailable(e.to_string())
            }
        })
    }

    /// POSTs a query body and decodes the JSON answer.
    async fn post_json<T>(&self, url: Url, body: &Value) -> Result<T, AppError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!(%url, body = %body, "OpenSearch request");

        let resp = self.send(self.client.post(url.clone()).json(body)).await?;
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &url, &text));
        }

        resp.json()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("Failed to parse response: {}", e)))
    }
}

/// Maps a non-2xx answer onto the error taxonomy.
fn status_error(status: StatusCode, url: &Url, body: &str) -> AppError {
    let detail = serde_json::from_str::<OpenSearchErrorBody>(body)
        .map(|b| b.error.describe())
        .unwrap_or_else(|_| body.chars().take(200).collect());

    if status == StatusCode::NOT_FOUND {
        AppError::NotFound(format!("{} ({})", url.path(), detail))
    } else {
        AppError::BackendUnavailable(format!("HTTP {} from {}: {}", status.as_u16(), url, detail))
    }
}

#[async_trait]
impl IndexBackend for OpenSearchClient {
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, AppError> {
        let url = self.endpoint(&[index, "_search"])?;
        self.post_json(url, body).await
    }

    async fn count(&self, index: &str, body: &Value) -> Result<u64, AppError> {
        let url = self.endpoint(&[index, "_count"])?;
        let resp: CountResponse = self.post_json(url, body).await?;
        Ok(resp.count)
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<DomainRecord>, AppError> {
        let url = self.endpoint(&[index, "_doc", id])?;
        debug!(%url, "OpenSearch get");

        let resp = self.send(self.client.get(url.clone())).await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &url, &text));
        }

        let doc: GetDocumentResponse = resp
            .json()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("Failed to parse response: {}", e)))?;

        Ok(doc.found.then(|| DomainRecord::new(doc.id, doc.source)))
    }
}
