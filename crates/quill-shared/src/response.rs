//! Standardized API response bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Success body for endpoints that report a message rather than a
/// resource (e.g. logout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Error body returned by every failing endpoint.
///
/// ```json
/// {"success": false, "message": "...", "error": "Forbidden", "code": 403}
/// ```
///
/// Validation failures add an `errors` map of field to messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,

    /// Human-readable explanation.
    pub message: String,

    /// Short error kind, e.g. `Not Found`.
    pub error: String,

    /// The HTTP status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    /// Field-level validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    pub fn new(code: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: error.into(),
            code: Some(code),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = Some(errors);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", message)
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            401,
            "Unauthenticated",
            "Authentication required. Please log in to access this resource.",
        )
    }

    pub fn invalid_credentials() -> Self {
        Self::new(401, "Unauthenticated", "Invalid credentials.")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, "Forbidden", message)
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found", "The requested resource was not found.")
    }

    pub fn validation(errors: BTreeMap<String, Vec<String>>) -> Self {
        Self::new(
            422,
            "Validation Failed",
            "Validation failed. Please check your input.",
        )
        .with_errors(errors)
    }

    pub fn too_many_requests(retry_after_secs: u64) -> Self {
        Self::new(
            429,
            "Too Many Requests",
            format!("Too many requests. Try again in {retry_after_secs} seconds."),
        )
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error", "An unexpected error occurred.")
    }
}
