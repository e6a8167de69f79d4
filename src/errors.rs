//! Typed error hierarchy for the taskdeck client.
//!
//! Two enums cover the two failure planes:
//! - `AuthError` — terminal session failures; the session cannot recover
//!   without a fresh login and the caller is redirected there
//! - `ApiError` — everything a request can surface to its caller,
//!   including passthrough business errors the client does not interpret

use thiserror::Error;

/// Terminal authentication failures.
///
/// Every variant here means the stored session is unusable: the client
/// clears it and signals the login redirect exactly once.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no refresh token stored; log in again")]
    NoRefreshToken,

    #[error("refresh token rejected by the backend (status {status}); log in again")]
    RefreshRejected { status: u16 },

    #[error("backend rejected a freshly refreshed token; log in again")]
    TokenNotAccepted,
}

/// Errors surfaced by API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Terminal auth failure; the session has been cleared.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Connection-level failure (offline, DNS, timeout). Recoverable:
    /// the session is left intact and the caller may retry.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-401 error status. Returned to the caller untouched; feature
    /// code owns the user-facing interpretation.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Session-file I/O failure.
    #[error("session storage error: {0}")]
    Session(#[source] std::io::Error),
}

impl ApiError {
    /// True for failures that end the session (redirect-to-login).
    pub fn is_terminal_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// True for failures worth retrying as-is (connectivity, not auth).
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// HTTP status for business errors, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
