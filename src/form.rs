//! Route create/edit forms.
//!
//! A [`RouteForm`] holds field values exactly as the user typed them.
//! [`RouteForm::parse`] turns it into a [`RouteDraft`] or a [`FormError`]
//! without touching the network.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde_json::Value;

use crate::error::FormError;
use crate::model::{HttpMethod, Route, RouteDraft};

/// Raw form field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteForm {
    pub path: String,
    /// Selected method names, as submitted.
    pub methods: Vec<String>,
    pub status_code: String,
    pub delay: String,
    pub description: String,
    /// JSON object text; blank means no extra headers.
    pub headers: String,
    /// JSON text of the response body.
    pub response: String,
    pub is_active: bool,
}

impl Default for RouteForm {
    fn default() -> Self {
        Self::blank()
    }
}

impl RouteForm {
    /// Values of a freshly reset create form.
    pub fn blank() -> Self {
        Self {
            path: String::new(),
            methods: vec![HttpMethod::Get.to_string()],
            status_code: "200".to_string(),
            delay: "0".to_string(),
            description: String::new(),
            headers: String::new(),
            response: String::new(),
            is_active: true,
        }
    }

    /// Edit form pre-filled from a stored route. JSON fields are
    /// pretty-printed.
    pub fn from_route(route: &Route) -> Self {
        Self {
            path: route.path.clone(),
            methods: route.methods.iter().map(ToString::to_string).collect(),
            status_code: route.status_code.to_string(),
            delay: route.delay.to_string(),
            description: route.description.clone().unwrap_or_default(),
            headers: pretty(&route.headers),
            response: pretty(&route.response),
            is_active: route.is_active,
        }
    }

    /// Decode an `application/x-www-form-urlencoded` body. Repeated
    /// `methods` keys accumulate; `is_active` is checked when present with
    /// any value other than `off`/`false`.
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut form = Self {
            methods: Vec::new(),
            is_active: false,
            ..Self::blank()
        };
        for (key, value) in url::form_urlencoded::parse(body) {
            let value = value.into_owned();
            match key.as_ref() {
                "path" => form.path = value,
                "methods" => form.methods.push(value),
                "status_code" => form.status_code = value,
                "delay" => form.delay = value,
                "description" => form.description = value,
                "headers" => form.headers = value,
                "response" => form.response = value,
                "is_active" => form.is_active = !matches!(value.as_str(), "off" | "false"),
                _ => {}
            }
        }
        form
    }

    /// Whether `method` is among the selected methods.
    pub fn has_method(&self, method: HttpMethod) -> bool {
        self.methods
            .iter()
            .any(|m| HttpMethod::from_str(m.trim()).ok() == Some(method))
    }

    /// Validate and convert to a draft.
    ///
    /// Required-field checks run first, then JSON parsing of `headers` and
    /// `response`.
    pub fn parse(&self) -> Result<RouteDraft, FormError> {
        let path = self.path.trim();
        if path.is_empty() {
            return Err(FormError::validation("path", "is required"));
        }

        let methods = self.parse_methods()?;
        let status_code = self.parse_status_code()?;
        let delay = self.parse_delay()?;

        if self.response.trim().is_empty() {
            return Err(FormError::validation("response", "is required"));
        }

        let headers = self.parse_headers()?;
        let response = serde_json::from_str::<Value>(&self.response)
            .map_err(|source| FormError::Parse {
                field: "response",
                source,
            })?;

        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(RouteDraft {
            path: path.to_string(),
            methods,
            status_code,
            delay,
            description,
            headers,
            response,
            is_active: self.is_active,
        })
    }

    fn parse_methods(&self) -> Result<BTreeSet<HttpMethod>, FormError> {
        let mut methods = BTreeSet::new();
        for raw in self.methods.iter().map(|m| m.trim()).filter(|m| !m.is_empty()) {
            let method = HttpMethod::from_str(raw)
                .map_err(|_| FormError::validation("methods", format!("unsupported method {raw}")))?;
            methods.insert(method);
        }
        if methods.is_empty() {
            return Err(FormError::validation("methods", "select at least one method"));
        }
        Ok(methods)
    }

    fn parse_status_code(&self) -> Result<u16, FormError> {
        let raw = self.status_code.trim();
        if raw.is_empty() {
            return Err(FormError::validation("status_code", "is required"));
        }
        match raw.parse::<u16>() {
            Ok(code) if (100..=599).contains(&code) => Ok(code),
            _ => Err(FormError::validation(
                "status_code",
                format!("{raw} is not an HTTP status code"),
            )),
        }
    }

    fn parse_delay(&self) -> Result<f64, FormError> {
        let raw = self.delay.trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        match raw.parse::<f64>() {
            Ok(delay) if delay.is_finite() && delay >= 0.0 => Ok(delay),
            _ => Err(FormError::validation(
                "delay",
                format!("{raw} is not a non-negative number of seconds"),
            )),
        }
    }

    fn parse_headers(&self) -> Result<BTreeMap<String, String>, FormError> {
        if self.headers.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let value = serde_json::from_str::<Value>(&self.headers).map_err(|source| {
            FormError::Parse {
                field: "headers",
                source,
            }
        })?;
        let Value::Object(map) = value else {
            return Err(FormError::validation("headers", "must be a JSON object"));
        };
        map.into_iter()
            .map(|(name, value)| match value {
                Value::String(v) => Ok((name, v)),
                Value::Number(v) => Ok((name, v.to_string())),
                Value::Bool(v) => Ok((name, v.to_string())),
                other => Err(FormError::validation(
                    "headers",
                    format!("value of {name} must be a string, got {other}"),
                )),
            })
            .collect()
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
