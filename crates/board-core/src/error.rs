//! Client Errors
//!
//! Error taxonomy for everything that talks to the board API.

use serde_json::Value;

use crate::validation::FieldErrors;

/// Common result type for API-backed operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to the UI action that triggered a request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response at all (offline, DNS, CORS rejection)
    #[error("Network/CORS error: check the API URL and backend CORS settings ({0})")]
    Network(String),

    /// Non-2xx response other than 401
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 401; the stored session is no longer valid
    #[error("Session expired, please sign in again")]
    Unauthorized,

    /// Rejected before any request was sent
    #[error("{0}")]
    Validation(FieldErrors),

    /// Response arrived but its body could not be understood
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Login response did not contain a token")]
    MissingToken,

    #[error("Email is already registered (409). Please sign in.")]
    EmailTaken,

    #[error("Registration refused (403). Self-registration is disabled on the server.")]
    RegistrationDisabled,

    #[error("Register endpoint not found (404). Expose one of /api/register, /api/auth/register, /register or /auth/register.")]
    RegisterEndpointMissing,
}

impl ApiError {
    /// Build the error for a non-2xx response
    ///
    /// The message comes from the body's `error` or `message` field when
    /// present, otherwise it is `HTTP {status}`.
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        ApiError::Http {
            status,
            message: extract_message(body).unwrap_or_else(|| format!("HTTP {}", status)),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
}
