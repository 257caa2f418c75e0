//! Panel controller.
//!
//! [`AdminController`] owns every piece of panel state: pagination and
//! filters, the cached page of routes, tabs, notices, the pending search, the
//! open edit session and issued delete confirmations. Each user action is one
//! `&mut self` method that awaits its API call, updates state, and turns any
//! failure into a notice before handing it back to the caller.

use std::collections::HashMap;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{KeyStore, RouteApi};
use crate::config::Config;
use crate::error::{AdminError, ApiError, ControllerError};
use crate::form::RouteForm;
use crate::i18n::{Locale, Msg};
use crate::metrics;
use crate::model::{BatchOperation, BatchRequest, Route, RoutePage, RouteUpdate};
use crate::render::views::{self, FormMode, Panel};
use crate::render::{HealthView, ListView, Node};
use crate::state::{
    Debouncer, Notice, NoticeBoard, NoticeLevel, PageState, Tab, TabActivation, TabController,
};

/// Proof that deletion of `route_id` was requested. Must be confirmed (once)
/// or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmationToken {
    pub id: u64,
    pub route_id: u64,
}

/// Requested listing position. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Navigation {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub active_only: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
struct EditSession {
    route_id: u64,
    form: RouteForm,
}

/// Owner of all panel state; drives a [`RouteApi`].
pub struct AdminController<A: RouteApi> {
    api: A,
    locale: Locale,
    pages: PageState,
    list: ListView,
    health: HealthView,
    tabs: TabController,
    notices: NoticeBoard,
    search: Debouncer<String>,
    create_form: RouteForm,
    edit: Option<EditSession>,
    pending_deletes: HashMap<u64, u64>,
    next_token: u64,
    key_store: Option<KeyStore>,
}

impl<A: RouteApi> AdminController<A> {
    /// Create a controller. Nothing is fetched until [`load_routes`](Self::load_routes).
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            locale: config.locale,
            pages: PageState::new(config.per_page),
            list: ListView::Loading,
            health: HealthView::NotLoaded,
            tabs: TabController::default(),
            notices: NoticeBoard::new(config.notice_ttl()),
            search: Debouncer::new(config.debounce()),
            create_form: RouteForm::blank(),
            edit: None,
            pending_deletes: HashMap::new(),
            next_token: 1,
            key_store: None,
        }
    }

    /// Persist API key changes to `store`.
    pub fn with_key_store(mut self, store: KeyStore) -> Self {
        self.key_store = Some(store);
        self
    }

    // === Accessors ===

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn pages(&self) -> &PageState {
        &self.pages
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    /// Routes of the current page as last loaded.
    pub fn routes(&self) -> &[Route] {
        self.list.routes()
    }

    pub fn health(&self) -> &HealthView {
        &self.health
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn create_form(&self) -> &RouteForm {
        &self.create_form
    }

    /// Route id and form of the open edit session.
    pub fn edit_session(&self) -> Option<(u64, &RouteForm)> {
        self.edit.as_ref().map(|s| (s.route_id, &s.form))
    }

    /// Notices still on screen at `now`.
    pub fn notices(&mut self, now: Instant) -> &[Notice] {
        self.notices.visible(now)
    }

    /// Most recent notice, expired or not.
    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.latest()
    }

    /// Remove and return every notice.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(level, message, Instant::now());
    }

    fn succeed(&mut self, msg: Msg) {
        let text = self.locale.text(msg);
        self.notify(NoticeLevel::Success, text);
    }

    /// Log `err` and put it on screen under the localized `msg`.
    fn fail(&mut self, msg: Msg, err: &dyn std::fmt::Display) {
        let text = self.locale.text(msg);
        error!(error = %err, "{}", Locale::En.text(msg));
        self.notify(NoticeLevel::Error, format!("{text}: {err}"));
    }

    // === Listing ===

    /// Fetch the current page and replace the list view.
    ///
    /// When the backend reports fewer pages than the current one (e.g. after
    /// deleting the last route of the last page), the page is clamped and
    /// fetched once more.
    #[instrument(skip(self), fields(page = self.pages.current_page()))]
    pub async fn load_routes(&mut self) -> Result<(), ApiError> {
        self.list = ListView::Loading;
        metrics::inc_list_reloads();

        let mut page = match self.fetch_page().await {
            Ok(page) => page,
            Err(e) => return Err(self.list_failed(e)),
        };
        if self.pages.apply_page(&page) {
            debug!(
                page = self.pages.current_page(),
                "Current page out of range, loading last page"
            );
            page = match self.fetch_page().await {
                Ok(page) => page,
                Err(e) => return Err(self.list_failed(e)),
            };
            self.pages.apply_page(&page);
        }

        let mut routes = page.routes;
        routes.truncate(self.pages.items_per_page() as usize);
        debug!(
            count = routes.len(),
            total = self.pages.total_routes(),
            "Routes loaded"
        );
        self.list = ListView::from_routes(routes);
        Ok(())
    }

    async fn fetch_page(&self) -> Result<RoutePage, ApiError> {
        self.api.list_routes(&self.pages.query()).await
    }

    fn list_failed(&mut self, err: ApiError) -> ApiError {
        self.list = ListView::Failed;
        self.fail(Msg::LoadFailed, &err);
        err
    }

    /// Reload after a successful mutation. A failed reload is already on
    /// screen and in the list placeholder; the mutation itself stands.
    async fn refresh(&mut self) {
        if let Err(e) = self.load_routes().await {
            debug!(error = %e, "Reload after mutation failed");
        }
    }

    async fn reload_if(&mut self, changed: bool) -> Result<bool, ApiError> {
        if changed {
            self.load_routes().await?;
        }
        Ok(changed)
    }

    /// Go to page `n`. Returns `false` (and fetches nothing) when `n` is out
    /// of range or already current.
    pub async fn set_page(&mut self, n: u32) -> Result<bool, ApiError> {
        let changed = self.pages.set_page(n);
        self.reload_if(changed).await
    }

    /// Go to page `n`, treating an out-of-range page as an error. Fetch
    /// failures come back as themselves.
    pub async fn goto_page(&mut self, n: u32) -> Result<(), AdminError> {
        if n == self.pages.current_page() {
            return Ok(());
        }
        if !self.set_page(n).await? {
            return Err(ControllerError::PageOutOfRange {
                page: n,
                pages: self.pages.total_pages().max(1),
            }
            .into());
        }
        Ok(())
    }

    pub async fn next_page(&mut self) -> Result<bool, ApiError> {
        let changed = self.pages.next_page();
        self.reload_if(changed).await
    }

    pub async fn prev_page(&mut self) -> Result<bool, ApiError> {
        let changed = self.pages.previous_page();
        self.reload_if(changed).await
    }

    pub async fn set_items_per_page(&mut self, n: u32) -> Result<bool, ApiError> {
        let changed = self.pages.set_items_per_page(n);
        self.reload_if(changed).await
    }

    pub async fn set_active_only(&mut self, active_only: bool) -> Result<bool, ApiError> {
        let changed = self.pages.set_active_only(active_only);
        self.reload_if(changed).await
    }

    /// Apply a search term immediately, bypassing the debouncer.
    pub async fn set_search_term(&mut self, term: &str) -> Result<bool, ApiError> {
        self.search.cancel();
        let changed = self.pages.set_search_term(term);
        self.reload_if(changed).await
    }

    /// Apply every present field of `nav`, then reload.
    pub async fn navigate(&mut self, nav: Navigation) -> Result<(), ApiError> {
        if let Some(per_page) = nav.per_page {
            self.pages.set_items_per_page(per_page);
        }
        if let Some(active_only) = nav.active_only {
            self.pages.set_active_only(active_only);
        }
        if let Some(search) = nav.search.as_deref() {
            self.search.cancel();
            self.pages.set_search_term(search);
        }
        if let Some(page) = nav.page {
            self.pages.set_page(page);
        }
        self.load_routes().await
    }

    // === Debounced search ===

    /// Record a search keystroke at `now`. Supersedes any pending input.
    pub fn search_input(&mut self, term: impl Into<String>, now: Instant) {
        self.search.push(term.into(), now);
    }

    /// When the pending search input becomes due.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Apply the pending search input if its quiet period has elapsed.
    /// Returns whether a reload happened.
    pub async fn poll_search(&mut self, now: Instant) -> Result<bool, ApiError> {
        match self.search.poll(now) {
            Some(term) => self.apply_search(&term).await,
            None => Ok(false),
        }
    }

    /// Apply the pending search input now.
    pub async fn flush_search(&mut self) -> Result<bool, ApiError> {
        match self.search.flush() {
            Some(term) => self.apply_search(&term).await,
            None => Ok(false),
        }
    }

    async fn apply_search(&mut self, term: &str) -> Result<bool, ApiError> {
        debug!(term, "Applying search");
        let changed = self.pages.set_search_term(term);
        self.reload_if(changed).await
    }

    // === Create ===

    /// Validate `form` and create the route.
    ///
    /// Form errors are reported without any request. On success the form is
    /// reset, the routes tab opened and page 1 reloaded.
    #[instrument(skip_all, fields(path = %form.path))]
    pub async fn create_route(&mut self, form: RouteForm) -> Result<Route, AdminError> {
        let draft = match form.parse() {
            Ok(draft) => draft,
            Err(e) => {
                warn!(field = e.field(), error = %e, "Create form rejected");
                self.create_form = form;
                let text = format!("{}: {e}", self.locale.text(Msg::InvalidForm));
                self.notify(NoticeLevel::Error, text);
                return Err(e.into());
            }
        };

        let route = match self.api.create_route(&draft).await {
            Ok(route) => route,
            Err(e) => {
                self.create_form = form;
                self.fail(Msg::CreateFailed, &e);
                return Err(e.into());
            }
        };

        info!(id = route.id, path = %route.path, "Route created");
        metrics::inc_route_mutations("create");
        self.succeed(Msg::RouteCreated);
        self.create_form = RouteForm::blank();
        self.tabs.activate(Tab::Routes);
        self.pages.reset_to_first();
        self.refresh().await;
        Ok(route)
    }

    // === Edit ===

    /// Fetch route `id` and open an edit session pre-filled with it.
    #[instrument(skip(self))]
    pub async fn begin_edit(&mut self, id: u64) -> Result<&RouteForm, ApiError> {
        let route = match self.api.get_route(id).await {
            Ok(route) => route,
            Err(e) => {
                self.fail(Msg::FetchRouteFailed, &e);
                return Err(e);
            }
        };
        let session = self.edit.insert(EditSession {
            route_id: id,
            form: RouteForm::from_route(&route),
        });
        Ok(&session.form)
    }

    /// Submit the open edit session with `form`'s values.
    ///
    /// On success the session is closed and the current page reloaded. On
    /// failure the session stays open holding the submitted values.
    #[instrument(skip_all)]
    pub async fn submit_edit(&mut self, form: RouteForm) -> Result<Route, AdminError> {
        let Some(session) = self.edit.as_mut() else {
            return Err(ControllerError::NoEditSession.into());
        };
        let route_id = session.route_id;
        session.form = form;

        let draft = match session.form.parse() {
            Ok(draft) => draft,
            Err(e) => {
                warn!(route_id, field = e.field(), error = %e, "Edit form rejected");
                let text = format!("{}: {e}", self.locale.text(Msg::InvalidForm));
                self.notify(NoticeLevel::Error, text);
                return Err(e.into());
            }
        };

        let route = match self.api.update_route(route_id, &RouteUpdate::from(draft)).await {
            Ok(route) => route,
            Err(e) => {
                self.fail(Msg::UpdateFailed, &e);
                return Err(e.into());
            }
        };

        info!(id = route_id, "Route updated");
        metrics::inc_route_mutations("update");
        self.edit = None;
        self.succeed(Msg::RouteUpdated);
        self.refresh().await;
        Ok(route)
    }

    /// Discard the open edit session. Returns whether one was open.
    pub fn close_edit(&mut self) -> bool {
        self.edit.take().is_some()
    }

    // === Toggle ===

    /// Send only the activation flag for route `id`, then reload.
    #[instrument(skip(self))]
    pub async fn set_route_active(&mut self, id: u64, is_active: bool) -> Result<Route, ApiError> {
        let route = match self.api.set_active(id, is_active).await {
            Ok(route) => route,
            Err(e) => {
                self.fail(Msg::OperationFailed, &e);
                return Err(e);
            }
        };

        info!(id, is_active, "Route activation changed");
        metrics::inc_route_mutations("toggle");
        self.succeed(if is_active {
            Msg::RouteActivated
        } else {
            Msg::RouteDeactivated
        });
        self.refresh().await;
        Ok(route)
    }

    /// Flip route `id`. Its current state comes from the loaded page, or
    /// from the backend when the route is not on it.
    pub async fn toggle_route(&mut self, id: u64) -> Result<Route, ApiError> {
        let cached = self.routes().iter().find(|r| r.id == id).map(|r| r.is_active);
        let is_active = match cached {
            Some(is_active) => is_active,
            None => match self.api.get_route(id).await {
                Ok(route) => route.is_active,
                Err(e) => {
                    self.fail(Msg::FetchRouteFailed, &e);
                    return Err(e);
                }
            },
        };
        self.set_route_active(id, !is_active).await
    }

    // === Delete ===

    /// First step of deletion. Nothing is sent until the token is confirmed.
    ///
    /// A route has at most one outstanding token; asking again returns it.
    pub fn request_delete(&mut self, route_id: u64) -> ConfirmationToken {
        if let Some((&id, _)) = self.pending_deletes.iter().find(|(_, &r)| r == route_id) {
            debug!(token = id, route_id, "Delete already pending");
            return ConfirmationToken { id, route_id };
        }
        let id = self.next_token;
        self.next_token += 1;
        self.pending_deletes.insert(id, route_id);
        debug!(token = id, route_id, "Delete requested");
        ConfirmationToken { id, route_id }
    }

    /// Outstanding token with id `token_id`.
    pub fn pending_delete(&self, token_id: u64) -> Option<ConfirmationToken> {
        self.pending_deletes
            .get(&token_id)
            .map(|&route_id| ConfirmationToken {
                id: token_id,
                route_id,
            })
    }

    /// Drop an outstanding token. Returns whether it was outstanding.
    pub fn cancel_delete(&mut self, token: ConfirmationToken) -> bool {
        self.pending_deletes.remove(&token.id).is_some()
    }

    /// Second step of deletion: consume `token` and delete its route.
    #[instrument(skip(self))]
    pub async fn confirm_delete(&mut self, token: ConfirmationToken) -> Result<(), AdminError> {
        let route_id = self
            .pending_deletes
            .remove(&token.id)
            .ok_or(ControllerError::UnknownConfirmation(token.id))?;

        if let Err(e) = self.api.delete_route(route_id).await {
            self.fail(Msg::DeleteFailed, &e);
            return Err(e.into());
        }

        info!(id = route_id, "Route deleted");
        metrics::inc_route_mutations("delete");
        self.succeed(Msg::RouteDeleted);
        self.refresh().await;
        Ok(())
    }

    // === Batch ===

    /// Apply `operation` to every id in `route_ids`, then reload.
    #[instrument(skip(self))]
    pub async fn batch(
        &mut self,
        operation: BatchOperation,
        route_ids: Vec<u64>,
    ) -> Result<String, ApiError> {
        let request = BatchRequest {
            operation,
            route_ids,
        };
        let message = match self.api.batch(&request).await {
            Ok(message) => message,
            Err(e) => {
                self.fail(Msg::BatchFailed, &e);
                return Err(e);
            }
        };

        info!(operation = %request.operation, count = request.route_ids.len(), "Batch operation applied");
        metrics::inc_route_mutations("batch");
        self.succeed(Msg::BatchCompleted);
        self.refresh().await;
        Ok(message)
    }

    // === Health & tabs ===

    /// Fetch the health snapshot into the health view.
    #[instrument(skip(self))]
    pub async fn load_health(&mut self) -> Result<(), ApiError> {
        match self.api.health().await {
            Ok(health) => {
                debug!(status = %health.status, "Health loaded");
                self.health = HealthView::Loaded(health);
                Ok(())
            }
            Err(e) => {
                self.health = HealthView::Failed;
                self.fail(Msg::HealthFailed, &e);
                Err(e)
            }
        }
    }

    /// Switch tabs without fetching anything. The caller decides what to do
    /// with [`TabActivation::load_health`].
    pub fn select_tab(&mut self, tab: Tab) -> TabActivation {
        self.tabs.activate(tab)
    }

    /// Make `tab` the only active tab; the health tab loads a fresh snapshot.
    pub async fn open_tab(&mut self, tab: Tab) -> Result<(), ApiError> {
        if self.select_tab(tab).load_health {
            self.load_health().await?;
        }
        Ok(())
    }

    // === API key ===

    /// Use `key` for all further requests and persist it when a key store is
    /// attached.
    pub fn save_api_key(&mut self, key: &str) -> Result<(), AdminError> {
        let key = key.trim();
        self.api.set_api_key(key.to_string());
        if let Some(store) = &self.key_store {
            if let Err(e) = store.save(key) {
                self.fail(Msg::RequestFailed, &e);
                return Err(e.into());
            }
        }
        self.succeed(Msg::ApiKeySaved);
        Ok(())
    }

    // === Rendering ===

    /// Whole panel as of `now`: active tab content, notices and the edit
    /// modal when a session is open.
    pub fn render_panel(&mut self, now: Instant) -> Node {
        let overlay = self
            .edit
            .as_ref()
            .map(|s| views::edit_modal(&s.form, s.route_id, self.locale));
        self.compose(now, overlay)
    }

    /// Panel with the delete prompt for `token` on top.
    pub fn render_confirmation(&mut self, token: ConfirmationToken, now: Instant) -> Node {
        let route = self.routes().iter().find(|r| r.id == token.route_id);
        let overlay = views::delete_confirmation(token.id, route, self.locale);
        self.compose(now, Some(overlay))
    }

    fn compose(&mut self, now: Instant, overlay: Option<Node>) -> Node {
        let locale = self.locale;
        let content = match self.tabs.active() {
            Tab::Routes => views::routes_tab(&self.pages, &self.list, locale),
            Tab::Create => views::route_form(&self.create_form, FormMode::Create, locale),
            Tab::Health => views::health_panel(&self.health, locale),
        };
        views::panel(Panel {
            locale,
            tabs: &self.tabs,
            notices: self.notices.visible(now),
            content,
            overlay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockCall, MockConfig, MockRouteApi};
    use crate::model::RouteDraft;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn controller(api: &MockRouteApi) -> AdminController<MockRouteApi> {
        AdminController::new(api.clone(), &Config::default())
    }

    fn valid_form(path: &str) -> RouteForm {
        RouteForm {
            path: path.to_string(),
            response: r#"{"ok": true}"#.to_string(),
            ..RouteForm::blank()
        }
    }

    #[tokio::test]
    async fn initial_load_fills_list_without_health() {
        let api = MockRouteApi::new();
        api.seed_many(3);
        let mut admin = controller(&api);

        admin.load_routes().await.unwrap();

        assert_eq!(admin.routes().len(), 3);
        assert_eq!(admin.pages().total_routes(), 3);
        assert!(!api.calls().contains(&MockCall::Health));
        assert_eq!(admin.health(), &HealthView::NotLoaded);
    }

    #[tokio::test]
    async fn out_of_range_page_does_not_reload() {
        let api = MockRouteApi::new();
        api.seed_many(25);
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();
        api.clear_calls();

        for n in [0, 4, 100, 1] {
            assert!(!admin.set_page(n).await.unwrap());
            assert_eq!(admin.pages().current_page(), 1);
        }
        assert!(api.calls().is_empty());

        assert!(admin.set_page(3).await.unwrap());
        assert_eq!(admin.routes().len(), 5);
    }

    #[tokio::test]
    async fn search_burst_reloads_once_with_last_term() {
        let api = MockRouteApi::new();
        api.seed(RouteDraft::new("/users", json!([])));
        api.seed(RouteDraft::new("/orders", json!([])));
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();
        api.clear_calls();

        let start = Instant::now();
        for (i, term) in ["u", "us", "use", "user", "users"].iter().enumerate() {
            let now = start + Duration::from_millis(100 * i as u64);
            admin.search_input(*term, now);
            assert!(!admin.poll_search(now).await.unwrap());
        }
        let due = admin.search_deadline().unwrap();
        assert!(admin.poll_search(due).await.unwrap());
        assert!(!admin.poll_search(due + Duration::from_secs(1)).await.unwrap());

        let lists = api.list_calls();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].search.as_deref(), Some("users"));
        assert_eq!(admin.routes()[0].path, "/users");
    }

    #[tokio::test]
    async fn created_route_round_trips() {
        let api = MockRouteApi::new();
        let mut admin = controller(&api);
        let form = RouteForm {
            methods: vec!["GET".to_string()],
            status_code: "200".to_string(),
            ..valid_form("/x")
        };

        let created = admin.create_route(form).await.unwrap();
        let fetched = api.get_route(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.path, "/x");
        assert_eq!(fetched.response, json!({"ok": true}));
        assert_eq!(admin.create_form(), &RouteForm::blank());
        assert_eq!(admin.tabs().active(), Tab::Routes);
        assert_eq!(admin.routes().len(), 1);
        assert_eq!(admin.latest_notice().unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn create_returns_to_first_page() {
        let api = MockRouteApi::new();
        api.seed_many(30);
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();
        admin.set_page(3).await.unwrap();

        admin.create_route(valid_form("/new")).await.unwrap();

        assert_eq!(admin.pages().current_page(), 1);
        assert_eq!(admin.routes()[0].path, "/new");
    }

    #[tokio::test]
    async fn malformed_json_is_rejected_without_request() {
        let api = MockRouteApi::new();
        let mut admin = controller(&api);

        let form = RouteForm {
            response: "{\"ok\": tru".to_string(),
            ..valid_form("/x")
        };
        let err = admin.create_route(form.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            AdminError::Form(crate::error::FormError::Parse { field: "response", .. })
        ));

        let form = RouteForm {
            headers: "{not json}".to_string(),
            ..valid_form("/x")
        };
        assert!(admin.create_route(form).await.is_err());

        assert!(api.calls().is_empty());
        let notice = admin.latest_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.starts_with("Invalid form"));
        assert_eq!(admin.create_form().headers, "{not json}");
    }

    #[tokio::test]
    async fn toggling_twice_restores_state() {
        let api = MockRouteApi::new();
        let route = api.seed(RouteDraft::new("/t", json!(1)));
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();

        let first = admin.toggle_route(route.id).await.unwrap();
        assert!(!first.is_active);
        let second = admin.toggle_route(route.id).await.unwrap();
        assert_eq!(second.is_active, route.is_active);
        assert_eq!(api.routes()[0], route);

        let updates: Vec<RouteUpdate> = api
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Update(_, update) => Some(update),
                _ => None,
            })
            .collect();
        assert_eq!(
            updates,
            vec![RouteUpdate::activation(false), RouteUpdate::activation(true)]
        );
    }

    #[tokio::test]
    async fn toggle_fetches_route_missing_from_page() {
        let api = MockRouteApi::new();
        let route = api.seed(RouteDraft::new("/t", json!(1)));
        let mut admin = controller(&api);

        let toggled = admin.toggle_route(route.id).await.unwrap();
        assert!(!toggled.is_active);
        assert_eq!(api.calls()[0], MockCall::Get(route.id));
    }

    #[tokio::test]
    async fn deleting_unknown_route_is_http_status_error() {
        let api = MockRouteApi::new();
        let mut admin = controller(&api);

        let token = admin.request_delete(999);
        assert!(api.calls().is_empty());

        let err = admin.confirm_delete(token).await.unwrap_err();
        match err {
            AdminError::Api(ApiError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected HTTP status error, got {other:?}"),
        }
        assert!(admin
            .latest_notice()
            .unwrap()
            .message
            .starts_with("Failed to delete route"));
    }

    #[tokio::test]
    async fn confirmation_tokens_are_single_use() {
        let api = MockRouteApi::new();
        let route = api.seed(RouteDraft::new("/d", json!(1)));
        let mut admin = controller(&api);

        let token = admin.request_delete(route.id);
        assert_eq!(admin.pending_delete(token.id), Some(token));
        admin.confirm_delete(token).await.unwrap();
        assert!(!api.routes()[0].is_active);

        let again = admin.confirm_delete(token).await.unwrap_err();
        assert!(matches!(
            again,
            AdminError::Controller(ControllerError::UnknownConfirmation(_))
        ));

        let cancelled = admin.request_delete(route.id);
        assert!(admin.cancel_delete(cancelled));
        assert!(!admin.cancel_delete(cancelled));
        assert!(admin.confirm_delete(cancelled).await.is_err());
        assert_eq!(
            api.calls()
                .iter()
                .filter(|c| matches!(c, MockCall::Delete(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn goto_page_separates_range_and_fetch_errors() {
        let api = MockRouteApi::new();
        api.seed_many(15);
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();

        let err = admin.goto_page(3).await.unwrap_err();
        assert!(matches!(
            err,
            AdminError::Controller(ControllerError::PageOutOfRange { page: 3, pages: 2 })
        ));
        assert_eq!(api.list_calls().len(), 1);

        api.set_offline(true);
        let err = admin.goto_page(2).await.unwrap_err();
        assert!(matches!(err, AdminError::Api(ApiError::Transport(_))));

        api.set_offline(false);
        admin.goto_page(1).await.unwrap();
        assert_eq!(admin.pages().current_page(), 1);
    }

    #[tokio::test]
    async fn repeated_delete_requests_share_one_token() {
        let api = MockRouteApi::new();
        let seeded = api.seed_many(2);
        let mut admin = controller(&api);

        let first = admin.request_delete(seeded[0].id);
        let second = admin.request_delete(seeded[0].id);
        assert_eq!(first, second);
        assert_eq!(admin.pending_deletes.len(), 1);

        let other = admin.request_delete(seeded[1].id);
        assert_ne!(other.id, first.id);
        assert_eq!(admin.pending_deletes.len(), 2);

        admin.confirm_delete(first).await.unwrap();
        assert_eq!(admin.pending_delete(first.id), None);
        assert_eq!(admin.pending_deletes.len(), 1);
    }

    #[tokio::test]
    async fn deleting_last_route_of_last_page_moves_back() {
        let api = MockRouteApi::new();
        let seeded = api.seed_many(11);
        let mut admin = controller(&api);
        admin.set_active_only(true).await.unwrap();
        admin.set_page(2).await.unwrap();
        assert_eq!(admin.routes().len(), 1);

        // The oldest route is alone on page 2.
        let token = admin.request_delete(seeded[0].id);
        admin.confirm_delete(token).await.unwrap();

        assert_eq!(admin.pages().current_page(), 1);
        assert_eq!(admin.pages().total_pages(), 1);
        assert_eq!(admin.routes().len(), 10);
    }

    #[tokio::test]
    async fn load_failure_shows_placeholder_but_mutation_failure_keeps_list() {
        let api = MockRouteApi::new();
        let route = api.seed(RouteDraft::new("/a", json!(1)));
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();

        api.set_offline(true);
        let err = admin.set_route_active(route.id, false).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(admin.routes().len(), 1);

        admin.load_routes().await.unwrap_err();
        assert_eq!(admin.list(), &ListView::Failed);
        assert_eq!(admin.latest_notice().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn edit_session_lifecycle() {
        let api = MockRouteApi::new();
        let route = api.seed(RouteDraft::new("/e", json!({"v": 1})));
        let mut admin = controller(&api);

        let err = admin.submit_edit(valid_form("/e")).await.unwrap_err();
        assert!(matches!(
            err,
            AdminError::Controller(ControllerError::NoEditSession)
        ));

        let form = admin.begin_edit(route.id).await.unwrap().clone();
        assert_eq!(form.path, "/e");
        assert!(form.response.contains("\"v\": 1"));

        let bad = RouteForm {
            response: "{".to_string(),
            ..form.clone()
        };
        assert!(admin.submit_edit(bad).await.is_err());
        assert_eq!(admin.edit_session().map(|(id, _)| id), Some(route.id));

        let good = RouteForm {
            status_code: "418".to_string(),
            ..form
        };
        let updated = admin.submit_edit(good).await.unwrap();
        assert_eq!(updated.status_code, 418);
        assert!(admin.edit_session().is_none());

        admin.begin_edit(route.id).await.unwrap();
        assert!(admin.close_edit());
        assert!(!admin.close_edit());
    }

    #[tokio::test]
    async fn health_loads_only_when_tab_opens() {
        let api = MockRouteApi::new();
        api.seed_many(2);
        let mut admin = controller(&api);

        admin.open_tab(Tab::Create).await.unwrap();
        assert!(api.calls().is_empty());

        admin.open_tab(Tab::Health).await.unwrap();
        assert_eq!(api.calls(), vec![MockCall::Health]);
        match admin.health() {
            HealthView::Loaded(health) => assert_eq!(health.total_routes, 2),
            other => panic!("unexpected health view {other:?}"),
        }

        api.set_offline(true);
        assert!(admin.open_tab(Tab::Health).await.is_err());
        assert_eq!(admin.health(), &HealthView::Failed);
    }

    #[test]
    fn select_tab_never_fetches() {
        let api = MockRouteApi::new();
        let mut admin = controller(&api);

        let activation = admin.select_tab(Tab::Create);
        assert!(activation.changed);
        assert!(!activation.load_health);
        assert!(admin.tabs().is_active(Tab::Create));

        assert!(admin.select_tab(Tab::Health).load_health);
        assert!(api.calls().is_empty());
        assert_eq!(admin.health(), &HealthView::NotLoaded);
    }

    #[tokio::test]
    async fn batch_reloads_page() {
        let api = MockRouteApi::new();
        let seeded = api.seed_many(3);
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();

        admin
            .batch(BatchOperation::Delete, vec![seeded[0].id, seeded[1].id])
            .await
            .unwrap();
        assert_eq!(admin.routes().len(), 1);
        assert_eq!(admin.pages().total_routes(), 1);
    }

    #[tokio::test]
    async fn saved_key_is_used_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path().join("admin.json"));
        let api = MockRouteApi::with_config(MockConfig {
            required_api_key: Some("s3cret".to_string()),
            ..MockConfig::default()
        });
        let mut admin = controller(&api).with_key_store(store.clone());

        let err = admin.load_routes().await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        admin.save_api_key(" s3cret ").unwrap();
        admin.load_routes().await.unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn panel_renders_active_tab_and_overlays() {
        let api = MockRouteApi::new();
        let route = api.seed(RouteDraft::new("/p", json!(1)));
        let mut admin = controller(&api);
        admin.load_routes().await.unwrap();

        let panel = admin.render_panel(Instant::now());
        assert_eq!(panel.find_by_class("route-card").len(), 1);
        assert!(panel.find_by_id("routes-tab").is_some());
        assert!(panel.find_by_id("edit-modal").is_none());

        admin.begin_edit(route.id).await.unwrap();
        assert!(admin.render_panel(Instant::now()).find_by_id("edit-modal").is_some());
        admin.close_edit();

        let token = admin.request_delete(route.id);
        let prompt = admin.render_confirmation(token, Instant::now());
        let confirm = prompt.find_by_id("delete-confirmation").unwrap();
        assert_eq!(confirm.tag, "div");
    }

    #[tokio::test]
    async fn notices_expire() {
        let api = MockRouteApi::new();
        let mut admin = controller(&api);
        admin.save_api_key("k").unwrap();

        let now = Instant::now();
        assert_eq!(admin.notices(now).len(), 1);
        assert!(admin.notices(now + Duration::from_secs(4)).is_empty());
    }
}
