//! Management API client over HTTP.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::config::Config;
use crate::error::ApiError;
use crate::metrics::{self, LatencyTimer};
use crate::model::{
    BatchRequest, HealthSnapshot, ListQuery, MessageResponse, MutationResponse, Route,
    RouteDraft, RoutePage, RouteUpdate,
};

use super::RouteApi;

/// Header carrying the management API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// reqwest-backed [`RouteApi`].
#[derive(Debug, Clone)]
pub struct HttpRouteApi {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL, e.g. `http://localhost:15001/_manage`.
    base_url: String,
    /// Key sent in [`API_KEY_HEADER`].
    api_key: String,
}

impl HttpRouteApi {
    /// Create a client from config.
    pub fn new(config: &Config, api_key: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(http, &config.base_url, api_key))
    }

    /// Create a client around an existing reqwest client.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the current API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send a request and decode a 2xx JSON body.
    ///
    /// Every failure is logged here and returned as-is.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        metrics::inc_api_requests(endpoint);
        let _timer = LatencyTimer::new(endpoint);

        let response = request.send().await.map_err(|e| {
            error!(endpoint, error = %e, "API request failed");
            metrics::inc_api_failures(endpoint, "transport");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(endpoint, status = status.as_u16(), body = %body, "API request failed");
            metrics::inc_api_failures(endpoint, "status");
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(endpoint, status = status.as_u16(), "API request succeeded");

        response.json::<T>().await.map_err(|e| {
            error!(endpoint, error = %e, "API response could not be decoded");
            metrics::inc_api_failures(endpoint, "decode");
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn stored_route(endpoint: &'static str, response: MutationResponse) -> Result<Route, ApiError> {
    response.route.ok_or_else(|| ApiError::Decode {
        endpoint: endpoint.to_string(),
        reason: "response has no route".to_string(),
    })
}

#[async_trait]
impl RouteApi for HttpRouteApi {
    fn set_api_key(&mut self, key: String) {
        self.api_key = key;
    }

    #[instrument(skip(self), fields(page = query.page, per_page = query.per_page))]
    async fn list_routes(&self, query: &ListQuery) -> Result<RoutePage, ApiError> {
        let request = self.request(Method::GET, "/routes").query(&query.to_pairs());
        self.execute("list_routes", request).await
    }

    #[instrument(skip(self))]
    async fn get_route(&self, id: u64) -> Result<Route, ApiError> {
        let request = self.request(Method::GET, &format!("/routes/{}", id));
        self.execute("get_route", request).await
    }

    #[instrument(skip(self, draft), fields(path = %draft.path))]
    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError> {
        let request = self.request(Method::POST, "/routes").json(draft);
        let response = self.execute("create_route", request).await?;
        stored_route("create_route", response)
    }

    #[instrument(skip(self, update))]
    async fn update_route(&self, id: u64, update: &RouteUpdate) -> Result<Route, ApiError> {
        let request = self
            .request(Method::POST, &format!("/routes/{}", id))
            .json(update);
        let response = self.execute("update_route", request).await?;
        stored_route("update_route", response)
    }

    #[instrument(skip(self))]
    async fn delete_route(&self, id: u64) -> Result<String, ApiError> {
        let request = self.request(Method::POST, &format!("/routes/delete1/{}", id));
        let response: MessageResponse = self.execute("delete_route", request).await?;
        Ok(response.message)
    }

    #[instrument(skip(self, request), fields(operation = %request.operation, count = request.route_ids.len()))]
    async fn batch(&self, request: &BatchRequest) -> Result<String, ApiError> {
        let builder = self.request(Method::POST, "/routes/batch").json(request);
        let response: MessageResponse = self.execute("batch", builder).await?;
        Ok(response.message)
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthSnapshot, ApiError> {
        let request = self.request(Method::GET, "/health");
        self.execute("health", request).await
    }
}
