//! Unified error types for the route admin client.

use thiserror::Error;

/// Unified error type for the route admin client.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Management API call failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// User-entered form data was rejected before submission.
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Persisted API key could not be read or written.
    #[error("key store error: {0}")]
    KeyStore(#[from] KeyStoreError),

    /// Controller protocol misuse (stale confirmation, missing edit session).
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdminError {
    /// HTTP status carried by the underlying API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Api(e) => e.status(),
            _ => None,
        }
    }
}

/// Errors raised by the management API client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The backend could not be reached (connect failure, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Raw response body, possibly empty.
        body: String,
    },

    /// A 2xx response body did not match the expected shape.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode {
        /// Logical endpoint name.
        endpoint: String,
        /// Decoder message.
        reason: String,
    },
}

impl ApiError {
    /// Status code for `HttpStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Client-side form rejections. No request is sent when one of these occurs.
#[derive(Error, Debug)]
pub enum FormError {
    /// A JSON field could not be parsed.
    #[error("{field} is not valid JSON: {source}")]
    Parse {
        /// Form field name.
        field: &'static str,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A required field is missing or a value is out of range.
    #[error("{field}: {reason}")]
    Validation {
        /// Form field name.
        field: &'static str,
        /// Human readable reason.
        reason: String,
    },
}

impl FormError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            FormError::Parse { field, .. } | FormError::Validation { field, .. } => field,
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        FormError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Persisted API key errors.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// Reading or writing the key file failed.
    #[error("key file io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The key file exists but is not a JSON object.
    #[error("key file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Misuse of the controller's multi-step protocols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Delete confirmation token was never issued, already used, or cancelled.
    #[error("unknown delete confirmation token {0}")]
    UnknownConfirmation(u64),

    /// An edit was submitted without an open edit session.
    #[error("no route is being edited")]
    NoEditSession,

    /// A page outside the current listing was requested.
    #[error("page {page} is out of range (1-{pages})")]
    PageOutOfRange { page: u32, pages: u32 },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AdminError>;
