use log::debug;
use reqwest::Method;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

use super::models::{Product, ProductDraft, ProductId};
use super::store::ProductStore;
use crate::config::CatalogConfig;
use crate::error::CatalogError;

const USER_AGENT: &str = "catalog-core/0.1";
const ACCEPT: &str = "application/json";
const PRODUCTS_PATH: &str = "products";
const MAX_API_HISTORY: usize = 100;

#[derive(Debug, Clone)]
pub struct ApiCall {
    pub method: String,
    pub url: String,
    pub timestamp: OffsetDateTime,
    pub status_code: u16,
    pub success: bool,
}

/// HTTP client for the `/products` collection resource.
///
/// Clones share the underlying connection pool and the request history.
#[derive(Debug, Clone)]
pub struct ProductsClient {
    client: reqwest::Client,
    base_url: String,
    history: Arc<Mutex<Vec<ApiCall>>>,
}

impl ProductsClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(ACCEPT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(ProductsClient {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            history: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, PRODUCTS_PATH)
    }

    pub fn item_url(&self, id: ProductId) -> String {
        format!("{}/{}/{}", self.base_url, PRODUCTS_PATH, id)
    }

    async fn call(
        &self,
        method: Method,
        url: &str,
        body: Option<&ProductDraft>,
    ) -> Result<reqwest::Response, CatalogError> {
        debug!("calling products API: {} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(draft) = body {
            request = request.json(draft);
        }

        let timestamp = OffsetDateTime::now_utc();
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                self.record(ApiCall {
                    method: method.to_string(),
                    url: url.to_string(),
                    timestamp,
                    status_code: status.as_u16(),
                    success: status.is_success(),
                });

                if status.is_success() {
                    Ok(response)
                } else {
                    Err(CatalogError::Http {
                        status: status.as_u16(),
                        url: url.to_string(),
                    })
                }
            }
            Err(e) => {
                self.record(ApiCall {
                    method: method.to_string(),
                    url: url.to_string(),
                    timestamp,
                    status_code: 0, // no response
                    success: false,
                });
                Err(CatalogError::Network(e))
            }
        }
    }

    fn record(&self, api_call: ApiCall) {
        if let Ok(mut history) = self.history.lock() {
            history.push(api_call);
            if history.len() > MAX_API_HISTORY {
                let excess = history.len() - MAX_API_HISTORY;
                history.drain(0..excess);
            }
        }
    }

    /// Recent calls, oldest first.
    pub fn api_call_history(&self) -> Vec<ApiCall> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    pub fn last_api_call(&self) -> Option<ApiCall> {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned())
    }

    pub fn clear_api_call_history(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }
}

impl ProductStore for ProductsClient {
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        let url = self.collection_url();
        let response = self.call(Method::GET, &url, None).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, CatalogError> {
        let url = self.collection_url();
        let response = self.call(Method::POST, &url, Some(draft)).await?;
        Ok(response.json().await?)
    }

    async fn replace(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, CatalogError> {
        let url = self.item_url(id);
        let response = self.call(Method::PUT, &url, Some(draft)).await?;
        Ok(response.json().await?)
    }

    async fn remove(&self, id: ProductId) -> Result<ProductId, CatalogError> {
        // Success is signalled by the status code alone; the body is ignored.
        let url = self.item_url(id);
        self.call(Method::DELETE, &url, None).await?;
        Ok(id)
    }
}

