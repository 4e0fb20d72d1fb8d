//! Catalog client and the backend seam.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use serde::Deserialize;
use shelf_catalog::search::{CatalogPage, CatalogQuery};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::timeout::TimeoutConfig;

/// Default path of the product aggregation endpoint.
pub const DEFAULT_SEARCH_PATH: &str = "/api/products/search";

/// Source of catalog pages.
///
/// The shop controller only ever talks to the backend through this trait.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Run one aggregation query.
    async fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogPage, FetchError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WrappedPage {
    data: Option<CatalogPage>,
    is_success: Option<bool>,
    message: Option<String>,
}

/// Decode a response body, bare or wrapped in `{ "data": ... }`.
pub fn decode_page(body: &[u8]) -> Result<CatalogPage, FetchError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;

    if value.get("data").is_some() {
        let wrapped: WrappedPage = serde_json::from_value(value)?;
        if wrapped.is_success == Some(false) {
            return Err(FetchError::Rejected(
                wrapped.message.unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }
        return wrapped
            .data
            .ok_or_else(|| FetchError::ParseError("envelope without data".to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

/// `reqwest`-backed catalog client.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    search_url: Url,
}

impl HttpCatalogClient {
    /// Create a client with default timeouts and search path.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, FetchError> {
        Self::with_config(base_url, DEFAULT_SEARCH_PATH, TimeoutConfig::default())
    }

    /// Create a client with an explicit search path and timeouts.
    pub fn with_config(
        base_url: impl AsRef<str>,
        search_path: &str,
        timeouts: TimeoutConfig,
    ) -> Result<Self, FetchError> {
        let search_url = join_url(base_url.as_ref(), search_path)?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.total)
            .build()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;

        Ok(Self { http, search_url })
    }

    /// Endpoint every query goes to.
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Full URL for a query, query string included.
    pub fn url_for(&self, query: &CatalogQuery) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .extend_pairs(query.to_query_pairs().iter().map(|(k, v)| (*k, v.as_str())));
        url
    }
}

#[async_trait]
impl CatalogBackend for HttpCatalogClient {
    async fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogPage, FetchError> {
        let url = self.url_for(query);
        let started = Instant::now();
        info!(
            page = query.page_number,
            page_size = query.page_size,
            sort = %query.sort_by,
            "fetching catalog page"
        );

        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect::<String>();
            return Err(FetchError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let page = decode_page(&body)?;
        debug!(
            url = %url,
            products = page.len(),
            total = page.total_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog page received"
        );
        Ok(page)
    }
}

fn join_url(base: &str, path: &str) -> Result<Url, FetchError> {
    let base = base.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(FetchError::InvalidUrl(base.to_string()));
    }
    let full = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&full).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", full, e)))
}
