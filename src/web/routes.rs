//! Web panel route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::client::RouteApi;

use super::handlers::{
    close_edit, create_page, create_submit, decide, delete_prompt, edit_page, edit_submit,
    health_page, index, list_routes, metrics, save_api_key, toggle, AppState,
};

/// Create the panel router.
pub fn create_router<A: RouteApi + 'static>(state: AppState<A>) -> Router {
    Router::new()
        .route("/", get(index))
        // Tabs
        .route("/routes", get(list_routes::<A>))
        .route("/create", get(create_page::<A>).post(create_submit::<A>))
        .route("/health", get(health_page::<A>))
        // Route actions
        .route(
            "/routes/:id/edit",
            get(edit_page::<A>).post(edit_submit::<A>),
        )
        .route("/edit/close", post(close_edit::<A>))
        .route("/routes/:id/toggle", post(toggle::<A>))
        .route("/routes/:id/delete", get(delete_prompt::<A>))
        .route("/confirmations/:token", post(decide::<A>))
        .route("/api-key", post(save_api_key::<A>))
        .route("/metrics", get(metrics::<A>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
