//! Pure view functions.
//!
//! Each function maps data to a [`Node`] tree and nothing else: no state is
//! kept between calls and the same input always yields the same tree.

use strum::IntoEnumIterator;

use crate::form::RouteForm;
use crate::i18n::{Locale, Msg};
use crate::model::{HealthSnapshot, HttpMethod, ListQuery, Route};
use crate::state::{Notice, PageState, Tab, TabController, PAGE_SIZES};

use super::{el, Element, Node};

/// What the route list area shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListView {
    /// Nothing fetched yet, or a fetch is in flight.
    #[default]
    Loading,
    /// The current page has no routes.
    Empty,
    /// The last load failed.
    Failed,
    Loaded(Vec<Route>),
}

impl ListView {
    pub fn from_routes(routes: Vec<Route>) -> Self {
        if routes.is_empty() {
            ListView::Empty
        } else {
            ListView::Loaded(routes)
        }
    }

    /// Routes currently shown.
    pub fn routes(&self) -> &[Route] {
        match self {
            ListView::Loaded(routes) => routes,
            _ => &[],
        }
    }
}

/// What the health tab shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HealthView {
    #[default]
    NotLoaded,
    Loaded(HealthSnapshot),
    Failed,
}

/// Which form [`route_form`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: u64 },
}

/// Link to a listing page.
pub fn list_href(query: &ListQuery) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query.to_pairs() {
        serializer.append_pair(key, &value);
    }
    format!("/routes?{}", serializer.finish())
}

fn tab_href(tab: Tab) -> &'static str {
    match tab {
        Tab::Routes => "/routes",
        Tab::Create => "/create",
        Tab::Health => "/health",
    }
}

fn button(label: &str) -> Element {
    el("button").class("btn").attr("type", "submit").text(label)
}

fn post_form(action: impl Into<String>) -> Element {
    el("form").attr("method", "post").attr("action", action)
}

/// One route card: method badges, status, path, description and actions.
pub fn route_card(route: &Route, locale: Locale) -> Node {
    let badges = route.methods.iter().map(|method| {
        el("span")
            .class("method-badge")
            .class(format!("method-{}", method.css_suffix()))
            .text(method.to_string())
    });

    let (status_class, status_text) = if route.is_active {
        ("status-active", locale.text(Msg::StatusActive))
    } else {
        ("status-inactive", locale.text(Msg::StatusInactive))
    };

    let header = el("div")
        .class("route-header")
        .child(el("span").class("route-id").text(format!("#{}", route.id)))
        .child(el("span").class("route-methods").children(badges))
        .child(
            el("span")
                .class("route-status")
                .class(status_class)
                .text(status_text),
        );

    let toggle_label = if route.is_active {
        locale.text(Msg::Deactivate)
    } else {
        locale.text(Msg::Activate)
    };

    let actions = el("div")
        .class("route-actions")
        .child(
            el("a")
                .class("btn")
                .class("btn-edit")
                .attr("href", format!("/routes/{}/edit", route.id))
                .text(locale.text(Msg::Edit)),
        )
        .child(
            post_form(format!("/routes/{}/toggle", route.id))
                .class("inline")
                .child(button(toggle_label).class("btn-toggle")),
        )
        .child(
            el("a")
                .class("btn")
                .class("btn-delete")
                .attr("href", format!("/routes/{}/delete", route.id))
                .text(locale.text(Msg::Delete)),
        );

    let mut card = el("div")
        .class("route-card")
        .class_if(!route.is_active, "inactive")
        .attr("data-route-id", route.id.to_string())
        .child(header)
        .child(el("div").class("route-path").text(route.path.as_str()));
    if let Some(description) = route.description() {
        card = card.child(el("div").class("route-description").text(description));
    }
    card.child(actions).into()
}

/// The list area for `view`. Fully replaces whatever was shown before.
pub fn route_list(view: &ListView, locale: Locale) -> Node {
    let list = el("div").attr("id", "routes-list");
    let list = match view {
        ListView::Loading => list.child(el("div").class("loading").text(locale.text(Msg::Loading))),
        ListView::Empty => list.child(el("div").class("empty").text(locale.text(Msg::NoRoutes))),
        ListView::Failed => list.child(el("div").class("error").text(locale.text(Msg::LoadFailed))),
        ListView::Loaded(routes) => list.children(routes.iter().map(|r| route_card(r, locale))),
    };
    list.into()
}

/// Previous/next controls and the page summary.
pub fn pagination(pages: &PageState, locale: Locale) -> Node {
    let step = |enabled: bool, page: u32, label: &str| -> Node {
        if enabled {
            let query = ListQuery {
                page,
                ..pages.query()
            };
            el("a")
                .class("btn")
                .class("page-link")
                .attr("href", list_href(&query))
                .text(label)
                .into()
        } else {
            el("span")
                .class("btn")
                .class("page-link")
                .class("disabled")
                .text(label)
                .into()
        }
    };

    let summary = format!(
        "{} {} / {} · {} {}",
        locale.text(Msg::Page),
        pages.current_page(),
        pages.total_pages().max(1),
        locale.text(Msg::Total),
        pages.total_routes(),
    );

    el("div")
        .class("pagination")
        .child(step(
            pages.has_previous(),
            pages.current_page().saturating_sub(1),
            locale.text(Msg::Previous),
        ))
        .child(el("span").class("page-info").text(summary))
        .child(step(
            pages.has_next(),
            pages.current_page() + 1,
            locale.text(Msg::Next),
        ))
        .into()
}

/// Search, active-only and page size controls.
pub fn filters(pages: &PageState, locale: Locale) -> Node {
    let sizes = PAGE_SIZES.iter().map(|size| {
        el("option")
            .attr("value", size.to_string())
            .flag("selected", *size == pages.items_per_page())
            .text(size.to_string())
    });

    el("form")
        .class("filters")
        .attr("method", "get")
        .attr("action", "/routes")
        .child(
            el("input")
                .attr("type", "search")
                .attr("name", "search")
                .attr("placeholder", locale.text(Msg::Search))
                .attr("value", pages.search_term()),
        )
        .child(
            el("label")
                .child(
                    el("input")
                        .attr("type", "checkbox")
                        .attr("name", "active_only")
                        .attr("value", "true")
                        .flag("checked", pages.active_only()),
                )
                .text(locale.text(Msg::ActiveOnly)),
        )
        .child(
            el("label")
                .text(locale.text(Msg::PerPage))
                .child(el("select").attr("name", "per_page").children(sizes)),
        )
        .child(button(locale.text(Msg::Apply)))
        .into()
}

/// Health key/value block.
pub fn health_panel(view: &HealthView, locale: Locale) -> Node {
    let panel = el("div").attr("id", "health-info");
    let panel = match view {
        HealthView::NotLoaded => panel.child(el("div").class("loading").text(locale.text(Msg::Loading))),
        HealthView::Failed => {
            panel.child(el("div").class("error").text(locale.text(Msg::HealthFailed)))
        }
        HealthView::Loaded(health) => {
            let row = |label: Msg, value: String| {
                el("p")
                    .child(el("strong").text(format!("{}:", locale.text(label))))
                    .text(format!(" {value}"))
            };
            panel
                .child(row(Msg::Status, health.status.clone()))
                .child(row(Msg::Database, health.database.clone()))
                .child(row(Msg::TotalRoutes, health.total_routes.to_string()))
                .child(row(Msg::ActiveRoutes, health.active_routes.to_string()))
                .child(row(Msg::InactiveRoutes, health.inactive().to_string()))
                .child(row(Msg::LastChecked, health.checked_at_label()))
        }
    };
    panel.into()
}

/// Every stored field of one route.
pub fn route_detail(route: &Route, locale: Locale) -> Node {
    let row = |label: &str, value: Node| {
        el("div")
            .class("detail-row")
            .child(el("strong").text(format!("{label}:")))
            .child(value)
    };
    let text = |value: String| -> Node { el("span").text(value).into() };
    let block = |value: String| -> Node { el("pre").text(value).into() };
    let pretty = |value: &serde_json::Value| serde_json::to_string_pretty(value).unwrap_or_default();

    let headers = serde_json::to_value(&route.headers).unwrap_or_default();
    el("div")
        .class("route-detail")
        .child(route_card(route, locale))
        .child(row(locale.text(Msg::StatusCode), text(route.status_code.to_string())))
        .child(row(locale.text(Msg::Delay), text(route.delay.to_string())))
        .child(row("created_at", text(route.created_at.clone().unwrap_or_else(|| "-".to_string()))))
        .child(row("updated_at", text(route.updated_at.clone().unwrap_or_else(|| "-".to_string()))))
        .child(row(locale.text(Msg::Headers), block(pretty(&headers))))
        .child(row(locale.text(Msg::ResponseBody), block(pretty(&route.response))))
        .into()
}

/// Create or edit form holding `form`'s raw values.
pub fn route_form(form: &RouteForm, mode: FormMode, locale: Locale) -> Node {
    let (id, action, submit) = match mode {
        FormMode::Create => (
            "create-form".to_string(),
            "/create".to_string(),
            Msg::CreateRoute,
        ),
        FormMode::Edit { id } => (
            "edit-form".to_string(),
            format!("/routes/{id}/edit"),
            Msg::UpdateRoute,
        ),
    };

    let field = |label: Msg, control: Element| {
        el("div")
            .class("form-group")
            .child(el("label").text(locale.text(label)))
            .child(control)
    };

    let methods = HttpMethod::iter().map(|method| {
        el("label").class("method-option").child(
            el("input")
                .attr("type", "checkbox")
                .attr("name", "methods")
                .attr("value", method.to_string())
                .flag("checked", form.has_method(method)),
        )
        .text(method.to_string())
    });

    let path = el("input")
        .attr("type", "text")
        .attr("name", "path")
        .attr("value", form.path.as_str())
        .flag("required", true)
        // Path changes are not accepted on update.
        .flag("readonly", matches!(mode, FormMode::Edit { .. }));

    el("form")
        .class("route-form")
        .attr("id", id)
        .attr("method", "post")
        .attr("action", action)
        .child(field(Msg::Path, path))
        .child(field(Msg::Methods, el("div").class("methods").children(methods)))
        .child(field(
            Msg::StatusCode,
            el("input")
                .attr("type", "number")
                .attr("name", "status_code")
                .attr("min", "100")
                .attr("max", "599")
                .attr("value", form.status_code.as_str())
                .flag("required", true),
        ))
        .child(field(
            Msg::Delay,
            el("input")
                .attr("type", "number")
                .attr("name", "delay")
                .attr("min", "0")
                .attr("step", "0.1")
                .attr("value", form.delay.as_str()),
        ))
        .child(field(
            Msg::Description,
            el("input")
                .attr("type", "text")
                .attr("name", "description")
                .attr("value", form.description.as_str()),
        ))
        .child(field(
            Msg::Headers,
            el("textarea")
                .attr("name", "headers")
                .attr("rows", "3")
                .text(form.headers.as_str()),
        ))
        .child(field(
            Msg::ResponseBody,
            el("textarea")
                .attr("name", "response")
                .attr("rows", "8")
                .flag("required", true)
                .text(form.response.as_str()),
        ))
        .child(field(
            Msg::IsActive,
            el("input")
                .attr("type", "checkbox")
                .attr("name", "is_active")
                .flag("checked", form.is_active),
        ))
        .child(button(locale.text(submit)).class("btn-primary"))
        .into()
}

/// Edit form shown as a modal over the panel.
pub fn edit_modal(form: &RouteForm, route_id: u64, locale: Locale) -> Node {
    el("div")
        .class("modal")
        .attr("id", "edit-modal")
        .child(
            el("div")
                .class("modal-content")
                .child(route_form(form, FormMode::Edit { id: route_id }, locale))
                .child(post_form("/edit/close").child(button(locale.text(Msg::Cancel)))),
        )
        .into()
}

/// Two-step delete prompt for an issued confirmation token.
pub fn delete_confirmation(
    token: u64,
    route: Option<&Route>,
    locale: Locale,
) -> Node {
    let target = route
        .map(|r| format!("{} {}", r.methods_label(), r.path))
        .unwrap_or_default();
    let action = format!("/confirmations/{token}");

    el("div")
        .class("modal")
        .attr("id", "delete-confirmation")
        .child(
            el("div")
                .class("modal-content")
                .child(el("p").text(locale.text(Msg::ConfirmDelete)))
                .child(el("p").class("route-path").text(target))
                .child(
                    post_form(action.clone())
                        .class("inline")
                        .child(hidden("decision", "confirm"))
                        .child(button(locale.text(Msg::Confirm)).class("btn-delete")),
                )
                .child(
                    post_form(action)
                        .class("inline")
                        .child(hidden("decision", "cancel"))
                        .child(button(locale.text(Msg::Cancel))),
                ),
        )
        .into()
}

fn hidden(name: &str, value: &str) -> Element {
    el("input")
        .attr("type", "hidden")
        .attr("name", name.to_string())
        .attr("value", value)
}

/// Active notices, newest last.
pub fn notices(notices: &[Notice]) -> Node {
    el("div")
        .attr("id", "notices")
        .children(notices.iter().map(|notice| {
            el("div")
                .class("alert")
                .class(format!("alert-{}", notice.level))
                .text(notice.message.as_str())
        }))
        .into()
}

/// Tab navigation.
pub fn tab_bar(tabs: &TabController, locale: Locale) -> Node {
    el("nav")
        .class("tabs")
        .children(tabs.tabs().map(|(tab, active)| {
            el("a")
                .class("tab")
                .class_if(active, "active")
                .attr("href", tab_href(tab))
                .attr("data-tab", tab.id())
                .text(tab.label(locale))
        }))
        .into()
}

/// API key entry.
pub fn api_key_form(locale: Locale) -> Node {
    post_form("/api-key")
        .class("api-key")
        .child(
            el("input")
                .attr("type", "password")
                .attr("name", "api_key")
                .attr("placeholder", locale.text(Msg::ApiKey)),
        )
        .child(button(locale.text(Msg::SaveApiKey)))
        .into()
}

/// Content of the routes tab.
pub fn routes_tab(pages: &PageState, list: &ListView, locale: Locale) -> Node {
    el("div")
        .child(filters(pages, locale))
        .child(route_list(list, locale))
        .child(pagination(pages, locale))
        .into()
}

/// Pieces the whole panel is assembled from.
pub struct Panel<'a> {
    pub locale: Locale,
    pub tabs: &'a TabController,
    pub notices: &'a [Notice],
    /// Content of the active tab.
    pub content: Node,
    /// Modal shown over the content.
    pub overlay: Option<Node>,
}

/// Whole panel: title, key form, tabs, notices, active tab content.
pub fn panel(panel: Panel<'_>) -> Node {
    let Panel {
        locale,
        tabs,
        notices: active_notices,
        content,
        overlay,
    } = panel;

    let section = el("section")
        .class("tab-content")
        .class("active")
        .attr("id", tabs.active().id())
        .child(content);

    let mut root = el("div")
        .class("container")
        .child(el("h1").text(locale.text(Msg::PanelTitle)))
        .child(api_key_form(locale))
        .child(tab_bar(tabs, locale))
        .child(notices(active_notices))
        .child(section);
    if let Some(overlay) = overlay {
        root = root.child(overlay);
    }
    root.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RouteDraft, RoutePage};
    use crate::state::NoticeLevel;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn sample_route() -> Route {
        let mut draft = RouteDraft::new("/api/users", json!({"users": []}));
        draft.methods = BTreeSet::from([HttpMethod::Post, HttpMethod::Get]);
        draft.description = Some("List users".to_string());
        Route::from_draft(4, draft)
    }

    #[test]
    fn card_shows_methods_status_path_and_actions() {
        let card = route_card(&sample_route(), Locale::En);

        let badges: Vec<String> = card
            .find_by_class("method-badge")
            .iter()
            .map(|b| Node::Element((*b).clone()).text_content())
            .collect();
        assert_eq!(badges, vec!["GET", "POST"]);
        assert_eq!(card.find_by_class("method-get").len(), 1);

        let status = card.find_by_class("route-status")[0];
        assert!(status.has_class("status-active"));

        let path = Node::Element(card.find_by_class("route-path")[0].clone());
        assert_eq!(path.text_content(), "/api/users");
        assert_eq!(card.find_by_class("route-description").len(), 1);

        let edit = card.find_by_class("btn-edit")[0];
        assert_eq!(edit.get_attr("href"), Some("/routes/4/edit"));
        let toggle = Node::Element(card.find_by_class("btn-toggle")[0].clone());
        assert_eq!(toggle.text_content(), "Deactivate");
        assert_eq!(
            card.find_by_class("btn-delete")[0].get_attr("href"),
            Some("/routes/4/delete")
        );
    }

    #[test]
    fn card_omits_blank_description_and_marks_inactive() {
        let mut route = sample_route();
        route.description = Some("   ".to_string());
        route.is_active = false;

        let card = route_card(&route, Locale::Zh);
        assert!(card.find_by_class("route-description").is_empty());
        assert!(card.as_element().unwrap().has_class("inactive"));
        let toggle = Node::Element(card.find_by_class("btn-toggle")[0].clone());
        assert_eq!(toggle.text_content(), "激活");
    }

    #[test]
    fn list_rendering_is_deterministic() {
        let view = ListView::Loaded(vec![sample_route(), sample_route()]);
        assert_eq!(route_list(&view, Locale::En), route_list(&view, Locale::En));
        assert_eq!(route_list(&view, Locale::En).find_by_class("route-card").len(), 2);
    }

    #[test]
    fn list_placeholders() {
        let empty = route_list(&ListView::from_routes(Vec::new()), Locale::En);
        assert_eq!(empty.text_content(), "No routes");
        let failed = route_list(&ListView::Failed, Locale::Zh);
        assert_eq!(failed.text_content(), "加载失败");
    }

    #[test]
    fn pagination_links_keep_filters() {
        let mut pages = PageState::new(10);
        pages.apply_page(&RoutePage {
            routes: Vec::new(),
            total: 35,
            pages: 4,
            current_page: 1,
        });
        pages.set_search_term("user");
        pages.set_active_only(true);
        pages.set_page(2);

        let node = pagination(&pages, Locale::En);
        let links = node.find_by_class("page-link");
        assert_eq!(
            links[0].get_attr("href"),
            Some("/routes?page=1&per_page=10&active_only=true&search=user")
        );
        assert_eq!(
            links[1].get_attr("href"),
            Some("/routes?page=3&per_page=10&active_only=true&search=user")
        );
        assert!(node.text_content().contains("Page 2 / 4"));
    }

    #[test]
    fn first_page_disables_previous() {
        let pages = PageState::new(10);
        let node = pagination(&pages, Locale::En);
        let links = node.find_by_class("page-link");
        assert!(links[0].has_class("disabled"));
        assert_eq!(links[0].get_attr("href"), None);
    }

    #[test]
    fn health_panel_lists_counts() {
        let view = HealthView::Loaded(HealthSnapshot {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            total_routes: 5,
            active_routes: 3,
            inactive_routes: None,
            timestamp: 0.0,
        });
        let node = health_panel(&view, Locale::En);
        let text = node.text_content();
        assert!(text.contains("Status: healthy"));
        assert!(text.contains("Inactive routes: 2"));
        assert!(node.find_by_id("health-info").is_some());
    }

    #[test]
    fn create_form_checks_selected_methods() {
        let node = route_form(&RouteForm::blank(), FormMode::Create, Locale::En);
        let form = node.as_element().unwrap();
        assert_eq!(form.get_attr("action"), Some("/create"));

        let checked: Vec<&str> = node
            .find_by_class("method-option")
            .iter()
            .filter(|label| {
                label.children[0]
                    .as_element()
                    .and_then(|input| input.get_attr("checked"))
                    .is_some()
            })
            .map(|label| label.children[0].as_element().unwrap().get_attr("value").unwrap())
            .collect();
        assert_eq!(checked, vec!["GET"]);
    }

    #[test]
    fn edit_form_posts_to_route() {
        let node = edit_modal(&RouteForm::from_route(&sample_route()), 4, Locale::En);
        let form = node.find_by_id("edit-form").unwrap();
        assert_eq!(form.get_attr("action"), Some("/routes/4/edit"));
    }

    #[test]
    fn notices_use_level_class() {
        let notice = Notice {
            id: 1,
            level: NoticeLevel::Error,
            message: "Request failed".to_string(),
            expires_at: tokio::time::Instant::now(),
        };
        let node = notices(std::slice::from_ref(&notice));
        assert_eq!(node.find_by_class("alert-error").len(), 1);
    }

    #[test]
    fn tab_bar_marks_one_active() {
        let mut tabs = TabController::default();
        tabs.activate(Tab::Health);
        let node = tab_bar(&tabs, Locale::En);
        let active = node.find_by_class("active");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].get_attr("data-tab"), Some("health-tab"));
    }
}
