//! Management API clients.
//!
//! This module handles:
//! - The [`RouteApi`] seam the controller talks to
//! - The reqwest-backed client for a live backend
//! - An in-memory backend for tests and offline use
//! - The locally persisted API key

pub mod http;
pub mod keystore;
pub mod mock;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{
    BatchRequest, HealthSnapshot, ListQuery, Route, RouteDraft, RoutePage, RouteUpdate,
};

pub use http::HttpRouteApi;
pub use keystore::{KeyStore, DEFAULT_API_KEY, STORAGE_KEY};
pub use mock::{MockCall, MockConfig, MockRouteApi};

/// Operations offered by the mock-server management API.
///
/// Implementations report failures and hand them back unchanged; they never
/// retry.
#[async_trait]
pub trait RouteApi: Send + Sync {
    /// Replace the key sent with every subsequent request.
    fn set_api_key(&mut self, key: String);

    /// Fetch one page of routes.
    async fn list_routes(&self, query: &ListQuery) -> Result<RoutePage, ApiError>;

    /// Fetch a single route.
    async fn get_route(&self, id: u64) -> Result<Route, ApiError>;

    /// Create a route and return it as stored.
    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError>;

    /// Apply a (possibly partial) update and return the stored route.
    async fn update_route(&self, id: u64, update: &RouteUpdate) -> Result<Route, ApiError>;

    /// Delete a route. Returns the backend's message.
    async fn delete_route(&self, id: u64) -> Result<String, ApiError>;

    /// Run a bulk operation. Returns the backend's message.
    async fn batch(&self, request: &BatchRequest) -> Result<String, ApiError>;

    /// Fetch the backend health snapshot.
    async fn health(&self) -> Result<HealthSnapshot, ApiError>;

    /// Flip activation by sending only `is_active`.
    async fn set_active(&self, id: u64, is_active: bool) -> Result<Route, ApiError> {
        self.update_route(id, &RouteUpdate::activation(is_active)).await
    }
}
