//! Web panel handlers.
//!
//! Every handler locks the shared controller, runs one controller operation
//! and answers with the re-rendered panel or a redirect back to it. Failures
//! are already on the notice board by the time a handler sees them.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::client::RouteApi;
use crate::controller::{AdminController, Navigation};
use crate::error::{AdminError, ApiError, ControllerError};
use crate::form::RouteForm;
use crate::i18n::Msg;
use crate::render::html;
use crate::state::Tab;

/// Application state shared with handlers.
pub struct AppState<A: RouteApi> {
    /// Panel controller; requests are serialized through its lock.
    pub controller: Arc<Mutex<AdminController<A>>>,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl<A: RouteApi> AppState<A> {
    /// Create new app state.
    pub fn new(controller: AdminController<A>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            metrics: None,
        }
    }

    /// Expose `handle` on `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl<A: RouteApi> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            metrics: self.metrics.clone(),
        }
    }
}

/// Query string of `GET /routes`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub active_only: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    /// Filter form submissions always carry `search`; an unchecked
    /// `active_only` box is then simply missing.
    pub fn into_navigation(self) -> Navigation {
        let active_only = match self.active_only.as_deref() {
            Some(value) => Some(!matches!(value, "false" | "0" | "off")),
            None if self.search.is_some() => Some(false),
            None => None,
        };
        Navigation {
            page: self.page,
            per_page: self.per_page,
            active_only,
            search: self.search,
        }
    }
}

fn render<A: RouteApi>(controller: &mut AdminController<A>) -> Html<String> {
    let title = controller.locale().text(Msg::PanelTitle);
    let body = controller.render_panel(Instant::now());
    Html(html::document(controller.locale(), title, &body))
}

fn status_for(err: &AdminError) -> StatusCode {
    match err {
        AdminError::Api(ApiError::HttpStatus { status: 404, .. }) => StatusCode::NOT_FOUND,
        AdminError::Api(_) => StatusCode::BAD_GATEWAY,
        AdminError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdminError::Controller(ControllerError::UnknownConfirmation(_)) => StatusCode::NOT_FOUND,
        AdminError::Controller(ControllerError::NoEditSession) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn back_to_list() -> Response {
    Redirect::to("/routes").into_response()
}

/// `GET /` - redirect to the route list.
pub async fn index() -> impl IntoResponse {
    Redirect::to("/routes")
}

/// `GET /routes` - routes tab at the requested page and filters.
pub async fn list_routes<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    Query(params): Query<ListParams>,
) -> Response {
    let mut controller = state.controller.lock().await;
    controller.select_tab(Tab::Routes);
    if let Err(e) = controller.navigate(params.into_navigation()).await {
        debug!(error = %e, "Route list unavailable");
    }
    render(&mut controller).into_response()
}

/// `GET /create` - create tab.
pub async fn create_page<A: RouteApi + 'static>(State(state): State<AppState<A>>) -> Response {
    let mut controller = state.controller.lock().await;
    controller.select_tab(Tab::Create);
    render(&mut controller).into_response()
}

/// `POST /create` - submit the create form.
pub async fn create_submit<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    body: Bytes,
) -> Response {
    let form = RouteForm::from_urlencoded(&body);
    let mut controller = state.controller.lock().await;
    controller.select_tab(Tab::Create);

    match controller.create_route(form).await {
        Ok(_) => back_to_list(),
        Err(e) => (status_for(&e), render(&mut controller)).into_response(),
    }
}

/// `GET /health` - health tab with a fresh snapshot.
pub async fn health_page<A: RouteApi + 'static>(State(state): State<AppState<A>>) -> Response {
    let mut controller = state.controller.lock().await;
    if let Err(e) = controller.open_tab(Tab::Health).await {
        debug!(error = %e, "Health unavailable");
    }
    render(&mut controller).into_response()
}

/// `GET /routes/:id/edit` - open the edit modal.
pub async fn edit_page<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    Path(id): Path<u64>,
) -> Response {
    let mut controller = state.controller.lock().await;
    controller.select_tab(Tab::Routes);

    match controller.begin_edit(id).await {
        Ok(_) => render(&mut controller).into_response(),
        Err(e) => (status_for(&e.into()), render(&mut controller)).into_response(),
    }
}

/// `POST /routes/:id/edit` - submit the edit modal.
pub async fn edit_submit<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    Path(id): Path<u64>,
    body: Bytes,
) -> Response {
    let form = RouteForm::from_urlencoded(&body);
    let mut controller = state.controller.lock().await;

    // The session may belong to another route or be gone after a restart.
    if controller.edit_session().map(|(route_id, _)| route_id) != Some(id) {
        if let Err(e) = controller.begin_edit(id).await {
            return (status_for(&e.into()), render(&mut controller)).into_response();
        }
    }

    match controller.submit_edit(form).await {
        Ok(_) => back_to_list(),
        Err(e) => (status_for(&e), render(&mut controller)).into_response(),
    }
}

/// `POST /edit/close` - discard the edit modal.
pub async fn close_edit<A: RouteApi + 'static>(State(state): State<AppState<A>>) -> Response {
    state.controller.lock().await.close_edit();
    back_to_list()
}

/// `POST /routes/:id/toggle` - flip activation.
pub async fn toggle<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    Path(id): Path<u64>,
) -> Response {
    let mut controller = state.controller.lock().await;
    if let Err(e) = controller.toggle_route(id).await {
        debug!(id, error = %e, "Toggle failed");
    }
    back_to_list()
}

/// `GET /routes/:id/delete` - issue a confirmation token and show the prompt.
pub async fn delete_prompt<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    Path(id): Path<u64>,
) -> Response {
    let mut controller = state.controller.lock().await;
    let token = controller.request_delete(id);
    let title = controller.locale().text(Msg::PanelTitle);
    let body = controller.render_confirmation(token, Instant::now());
    Html(html::document(controller.locale(), title, &body)).into_response()
}

/// `POST /confirmations/:token` - confirm or cancel a pending delete.
pub async fn decide<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    Path(token_id): Path<u64>,
    body: Bytes,
) -> Response {
    let confirmed = url::form_urlencoded::parse(&body)
        .any(|(key, value)| key == "decision" && value == "confirm");

    let mut controller = state.controller.lock().await;
    let Some(token) = controller.pending_delete(token_id) else {
        let err = AdminError::from(ControllerError::UnknownConfirmation(token_id));
        return (status_for(&err), render(&mut controller)).into_response();
    };

    if !confirmed {
        controller.cancel_delete(token);
        return back_to_list();
    }
    if let Err(e) = controller.confirm_delete(token).await {
        debug!(token = token_id, error = %e, "Delete failed");
    }
    back_to_list()
}

/// `POST /api-key` - use and persist a new API key.
pub async fn save_api_key<A: RouteApi + 'static>(
    State(state): State<AppState<A>>,
    body: Bytes,
) -> Response {
    let key = url::form_urlencoded::parse(&body)
        .find(|(name, _)| name == "api_key")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    let mut controller = state.controller.lock().await;
    if let Err(e) = controller.save_api_key(&key) {
        debug!(error = %e, "API key not saved");
    }
    back_to_list()
}

/// `GET /metrics` - Prometheus exposition.
pub async fn metrics<A: RouteApi + 'static>(State(state): State<AppState<A>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_submission_without_checkbox_clears_active_only() {
        let params = ListParams {
            search: Some(String::new()),
            per_page: Some(25),
            ..ListParams::default()
        };
        let nav = params.into_navigation();
        assert_eq!(nav.active_only, Some(false));
        assert_eq!(nav.per_page, Some(25));
    }

    #[test]
    fn bare_list_link_keeps_filters() {
        assert_eq!(ListParams::default().into_navigation(), Navigation::default());
    }

    #[test]
    fn error_statuses() {
        let not_found = AdminError::Api(ApiError::HttpStatus {
            status: 404,
            body: String::new(),
        });
        assert_eq!(status_for(&not_found), StatusCode::NOT_FOUND);
        let offline = AdminError::Api(ApiError::Transport("refused".to_string()));
        assert_eq!(status_for(&offline), StatusCode::BAD_GATEWAY);
    }
}
