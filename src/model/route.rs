//! Route definitions as exchanged with the management API.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// HTTP method a mock route answers to.
///
/// Declaration order is the canonical display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Lowercase name, used for badge styling.
    pub fn css_suffix(self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

/// A method name on a stored route.
///
/// The backend stores whatever names it was given, so names outside
/// [`HttpMethod`] are kept verbatim instead of failing the whole listing.
/// Known names sort first, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RouteMethod {
    Known(HttpMethod),
    Other(String),
}

impl RouteMethod {
    pub fn known(&self) -> Option<HttpMethod> {
        match self {
            Self::Known(method) => Some(*method),
            Self::Other(_) => None,
        }
    }

    /// Lowercase name, used for badge styling.
    pub fn css_suffix(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

impl From<HttpMethod> for RouteMethod {
    fn from(method: HttpMethod) -> Self {
        Self::Known(method)
    }
}

impl From<String> for RouteMethod {
    fn from(raw: String) -> Self {
        match HttpMethod::from_str(raw.trim()) {
            Ok(method) => Self::Known(method),
            Err(_) => Self::Other(raw),
        }
    }
}

impl From<RouteMethod> for String {
    fn from(method: RouteMethod) -> Self {
        method.to_string()
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(method) => method.fmt(f),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Header values are arbitrary JSON on the backend; anything but an object
/// reads as no headers.
fn lenient_headers<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    })
}

fn header_values(headers: &BTreeMap<String, String>) -> BTreeMap<String, Value> {
    headers
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect()
}

/// A configured mock endpoint, owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Server-assigned identifier.
    pub id: u64,
    /// Request path the mock answers on.
    pub path: String,
    /// Accepted methods; never empty for routes created through this client.
    pub methods: BTreeSet<RouteMethod>,
    /// Status code of the mocked response.
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    /// Artificial latency in seconds.
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Extra response headers.
    #[serde(default, deserialize_with = "lenient_headers")]
    pub headers: BTreeMap<String, Value>,
    /// Mocked response body.
    #[serde(default)]
    pub response: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn default_status_code() -> u16 {
    200
}

fn default_active() -> bool {
    true
}

impl Route {
    /// Description if present and non-blank.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Comma separated method list, e.g. `GET,POST`.
    pub fn methods_label(&self) -> String {
        self.methods
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Build the route the backend would store for `draft` under `id`.
    pub fn from_draft(id: u64, draft: RouteDraft) -> Self {
        Self {
            id,
            path: draft.path,
            methods: draft.methods.into_iter().map(RouteMethod::from).collect(),
            status_code: draft.status_code,
            delay: draft.delay,
            description: draft.description,
            headers: header_values(&draft.headers),
            response: draft.response,
            is_active: draft.is_active,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Payload for creating a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDraft {
    pub path: String,
    pub methods: BTreeSet<HttpMethod>,
    pub status_code: u16,
    pub delay: f64,
    pub description: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub response: Value,
    pub is_active: bool,
}

impl RouteDraft {
    /// Minimal active draft answering `GET path` with `200 response`.
    pub fn new(path: impl Into<String>, response: Value) -> Self {
        Self {
            path: path.into(),
            methods: BTreeSet::from([HttpMethod::Get]),
            status_code: 200,
            delay: 0.0,
            description: None,
            headers: BTreeMap::new(),
            response,
            is_active: true,
        }
    }
}

/// Partial update. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<BTreeSet<HttpMethod>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl RouteUpdate {
    /// Update that only flips activation.
    pub fn activation(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    /// Apply to a stored route the way the backend does. The path is immutable
    /// server-side and is ignored.
    pub fn apply_to(&self, route: &mut Route) {
        if let Some(methods) = &self.methods {
            route.methods = methods.iter().copied().map(RouteMethod::from).collect();
        }
        if let Some(status_code) = self.status_code {
            route.status_code = status_code;
        }
        if let Some(delay) = self.delay {
            route.delay = delay;
        }
        if let Some(description) = &self.description {
            route.description = description.clone();
        }
        if let Some(headers) = &self.headers {
            route.headers = header_values(headers);
        }
        if let Some(response) = &self.response {
            route.response = response.clone();
        }
        if let Some(is_active) = self.is_active {
            route.is_active = is_active;
        }
    }
}

impl From<RouteDraft> for RouteUpdate {
    fn from(draft: RouteDraft) -> Self {
        Self {
            path: Some(draft.path),
            methods: Some(draft.methods),
            status_code: Some(draft.status_code),
            delay: Some(draft.delay),
            description: Some(draft.description),
            headers: Some(draft.headers),
            response: Some(draft.response),
            is_active: Some(draft.is_active),
        }
    }
}

/// One page of a route listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePage {
    pub routes: Vec<Route>,
    /// Matching routes across all pages.
    pub total: u64,
    /// Number of pages; 0 when nothing matches.
    pub pages: u32,
    pub current_page: u32,
}

/// Listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub active_only: bool,
    pub search: Option<String>,
}

impl ListQuery {
    /// Query string pairs in the form the backend expects.
    ///
    /// `active_only` is sent only when set: the backend treats any value,
    /// including `false`, as enabled.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if self.active_only {
            pairs.push(("active_only", "true".to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Body returned by create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub route: Option<Route>,
}

/// Body returned by delete and batch operations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Bulk operation kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BatchOperation {
    Activate,
    Deactivate,
    Delete,
}

/// Body of `POST /routes/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub operation: BatchOperation,
    pub route_ids: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn method_parsing_is_case_insensitive() {
        assert_eq!(HttpMethod::from_str("get").unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::from_str("PATCH").unwrap(), HttpMethod::Patch);
        assert!(HttpMethod::from_str("TRACE").is_err());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Post.css_suffix(), "post");
    }

    #[test]
    fn route_decodes_backend_payload() {
        let payload = json!({
            "id": 7,
            "path": "/api/users",
            "methods": ["POST", "GET"],
            "response": {"ok": true},
            "status_code": 201,
            "headers": {"X-Mock": "1"},
            "delay": 0.5,
            "description": null,
            "is_active": false,
            "created_at": "2024-01-15T10:30:00",
            "updated_at": null
        });

        let route: Route = serde_json::from_value(payload).unwrap();
        assert_eq!(route.id, 7);
        assert_eq!(route.methods_label(), "GET,POST");
        assert_eq!(route.status_code, 201);
        assert_eq!(route.headers.get("X-Mock"), Some(&json!("1")));
        assert!(!route.is_active);
        assert_eq!(route.description(), None);
        assert_eq!(route.created_at.as_deref(), Some("2024-01-15T10:30:00"));
    }

    #[test]
    fn route_keeps_non_canonical_methods_and_headers() {
        let payload = json!({
            "id": 9,
            "path": "/legacy",
            "methods": ["get", "HEAD", "POST"],
            "response": null,
            "headers": {"X-Count": 1, "X-Flag": true}
        });

        let route: Route = serde_json::from_value(payload).unwrap();
        assert_eq!(route.methods_label(), "GET,POST,HEAD");
        assert!(route.methods.contains(&RouteMethod::Known(HttpMethod::Get)));
        assert!(route.methods.contains(&RouteMethod::Other("HEAD".to_string())));
        assert_eq!(route.headers.get("X-Count"), Some(&json!(1)));

        let route: Route =
            serde_json::from_value(json!({"id": 1, "path": "/x", "methods": [], "headers": null}))
                .unwrap();
        assert!(route.headers.is_empty());
    }

    #[test]
    fn route_method_names() {
        assert_eq!(RouteMethod::from("patch".to_string()), RouteMethod::Known(HttpMethod::Patch));
        assert_eq!(RouteMethod::from("HEAD".to_string()).css_suffix(), "head");
        assert_eq!(RouteMethod::from("HEAD".to_string()).known(), None);
        assert_eq!(String::from(RouteMethod::Known(HttpMethod::Put)), "PUT");
    }

    #[test]
    fn activation_update_serializes_only_flag() {
        let body = serde_json::to_value(RouteUpdate::activation(false)).unwrap();
        assert_eq!(body, json!({"is_active": false}));
    }

    #[test]
    fn update_ignores_path_when_applied() {
        let mut route = Route::from_draft(1, RouteDraft::new("/a", json!(1)));
        let update = RouteUpdate {
            path: Some("/b".to_string()),
            status_code: Some(404),
            description: Some(Some("gone".to_string())),
            ..RouteUpdate::default()
        };
        update.apply_to(&mut route);
        assert_eq!(route.path, "/a");
        assert_eq!(route.status_code, 404);
        assert_eq!(route.description(), Some("gone"));
    }

    #[test]
    fn list_query_omits_inactive_filters() {
        let query = ListQuery {
            page: 2,
            per_page: 25,
            active_only: false,
            search: Some(String::new()),
        };
        assert_eq!(
            query.to_pairs(),
            vec![("page", "2".to_string()), ("per_page", "25".to_string())]
        );

        let query = ListQuery {
            active_only: true,
            search: Some("users".to_string()),
            ..query
        };
        assert_eq!(query.to_pairs().len(), 4);
        assert!(query.to_pairs().contains(&("active_only", "true".to_string())));
        assert!(query.to_pairs().contains(&("search", "users".to_string())));
    }

    #[test]
    fn batch_request_uses_lowercase_operation() {
        let body = serde_json::to_value(BatchRequest {
            operation: BatchOperation::Deactivate,
            route_ids: vec![1, 2],
        })
        .unwrap();
        assert_eq!(body, json!({"operation": "deactivate", "route_ids": [1, 2]}));
    }
}
