//! In-memory management API for unit testing.
//!
//! This module provides a backend stand-in that can be used in tests
//! without making real network requests. It reproduces the backend's
//! listing order, pagination, filtering and error statuses.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{
    BatchOperation, BatchRequest, HealthSnapshot, ListQuery, Route, RouteDraft, RoutePage,
    RouteUpdate,
};

use super::keystore::DEFAULT_API_KEY;
use super::RouteApi;

/// Configuration for mock backend behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Reject requests whose key differs from this one with 401.
    pub required_api_key: Option<String>,
    /// Fail every request with a transport error.
    pub offline: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    List(ListQuery),
    Get(u64),
    Create(RouteDraft),
    Update(u64, RouteUpdate),
    Delete(u64),
    Batch(BatchRequest),
    Health,
}

#[derive(Debug, Default)]
struct MockState {
    config: MockConfig,
    routes: Vec<Route>,
    next_id: u64,
    calls: Vec<MockCall>,
}

/// Mock management API. Clones share state.
#[derive(Debug, Clone)]
pub struct MockRouteApi {
    state: Arc<Mutex<MockState>>,
    /// Key this client instance sends.
    api_key: String,
}

impl Default for MockRouteApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRouteApi {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock backend with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                config,
                next_id: 1,
                ..MockState::default()
            })),
            api_key: DEFAULT_API_KEY.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a route directly, bypassing validation and call recording.
    pub fn seed(&self, draft: RouteDraft) -> Route {
        let mut state = self.lock();
        let route = Route::from_draft(state.next_id, draft);
        state.next_id += 1;
        state.routes.push(route.clone());
        route
    }

    /// Store `count` active routes at `/seed/<n>`.
    pub fn seed_many(&self, count: usize) -> Vec<Route> {
        (0..count)
            .map(|n| self.seed(RouteDraft::new(format!("/seed/{}", n), serde_json::json!(n))))
            .collect()
    }

    /// Toggle simulated network failure.
    pub fn set_offline(&self, offline: bool) {
        self.lock().config.offline = offline;
    }

    /// Snapshot of every stored route, in insertion order.
    pub fn routes(&self) -> Vec<Route> {
        self.lock().routes.clone()
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Listing requests received so far.
    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::List(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Record the call and apply configured failure modes.
    async fn enter(&self, call: MockCall) -> Result<MutexGuard<'_, MockState>, ApiError> {
        let latency_ms = self.lock().config.latency_ms;
        if latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(latency_ms)).await;
        }

        let mut state = self.lock();
        state.calls.push(call);

        if state.config.offline {
            return Err(ApiError::Transport("mock backend is offline".to_string()));
        }
        if let Some(required) = &state.config.required_api_key {
            if required != &self.api_key {
                return Err(status(401, r#"{"error": "Unauthorized"}"#));
            }
        }
        Ok(state)
    }
}

fn status(code: u16, body: &str) -> ApiError {
    ApiError::HttpStatus {
        status: code,
        body: body.to_string(),
    }
}

fn not_found() -> ApiError {
    status(404, "<h1>Not Found</h1>")
}

impl MockState {
    fn route_mut(&mut self, id: u64) -> Result<&mut Route, ApiError> {
        self.routes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(not_found)
    }
}

#[async_trait]
impl RouteApi for MockRouteApi {
    fn set_api_key(&mut self, key: String) {
        self.api_key = key;
    }

    async fn list_routes(&self, query: &ListQuery) -> Result<RoutePage, ApiError> {
        let state = self.enter(MockCall::List(query.clone())).await?;

        let search = query.search.as_deref().unwrap_or("").to_lowercase();
        // Newest first, like the backend's created_at DESC ordering.
        let matching: Vec<&Route> = state
            .routes
            .iter()
            .rev()
            .filter(|r| !query.active_only || r.is_active)
            .filter(|r| {
                search.is_empty()
                    || r.path.to_lowercase().contains(&search)
                    || r.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&search))
            })
            .collect();

        let per_page = query.per_page.max(1) as usize;
        let total = matching.len();
        let pages = total.div_ceil(per_page);
        let skip = (query.page.max(1) as usize - 1) * per_page;
        let routes = matching
            .into_iter()
            .skip(skip)
            .take(per_page)
            .cloned()
            .collect();

        Ok(RoutePage {
            routes,
            total: total as u64,
            pages: pages as u32,
            current_page: query.page,
        })
    }

    async fn get_route(&self, id: u64) -> Result<Route, ApiError> {
        let mut state = self.enter(MockCall::Get(id)).await?;
        state.route_mut(id).map(|r| r.clone())
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, ApiError> {
        let mut state = self.enter(MockCall::Create(draft.clone())).await?;

        if state.routes.iter().any(|r| r.path == draft.path) {
            return Err(status(409, r#"{"error": "Route already exists"}"#));
        }

        let route = Route::from_draft(state.next_id, draft.clone());
        state.next_id += 1;
        state.routes.push(route.clone());
        Ok(route)
    }

    async fn update_route(&self, id: u64, update: &RouteUpdate) -> Result<Route, ApiError> {
        let mut state = self.enter(MockCall::Update(id, update.clone())).await?;
        let route = state.route_mut(id)?;
        update.apply_to(route);
        Ok(route.clone())
    }

    async fn delete_route(&self, id: u64) -> Result<String, ApiError> {
        let mut state = self.enter(MockCall::Delete(id)).await?;
        // The backend soft-deletes: the route stays stored but inactive.
        state.route_mut(id)?.is_active = false;
        Ok("deleted".to_string())
    }

    async fn batch(&self, request: &BatchRequest) -> Result<String, ApiError> {
        let mut state = self.enter(MockCall::Batch(request.clone())).await?;
        let ids: BTreeSet<u64> = request.route_ids.iter().copied().collect();

        match request.operation {
            BatchOperation::Activate | BatchOperation::Deactivate => {
                let active = request.operation == BatchOperation::Activate;
                for route in state.routes.iter_mut().filter(|r| ids.contains(&r.id)) {
                    route.is_active = active;
                }
            }
            BatchOperation::Delete => state.routes.retain(|r| !ids.contains(&r.id)),
        }

        Ok(format!("Routes {}d successfully", request.operation))
    }

    async fn health(&self) -> Result<HealthSnapshot, ApiError> {
        let state = self.enter(MockCall::Health).await?;
        let total = state.routes.len() as u64;
        let active = state.routes.iter().filter(|r| r.is_active).count() as u64;
        Ok(HealthSnapshot {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            total_routes: total,
            active_routes: active,
            inactive_routes: Some(total - active),
            timestamp: chrono::Utc::now().timestamp() as f64,
        })
    }
}
