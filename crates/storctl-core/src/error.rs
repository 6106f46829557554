// ── Core error types ──
//
// Module-level errors. Each variant belongs to one failure class of the
// module contract: validation (before any network call), remote lookup,
// remote write, and transient unavailability. The `From<storctl_api::Error>`
// impl translates transport-layer errors into these classes.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input validation ─────────────────────────────────────────────
    #[error("{message}")]
    Validation { message: String },

    // ── Remote lookup ────────────────────────────────────────────────
    #[error("{message}")]
    NotFound { entity_type: String, message: String },

    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Remote write ─────────────────────────────────────────────────
    /// A vendor call failed; `action` says what we were doing.
    #[error("{action}: {source}")]
    Remote {
        action: String,
        #[source]
        source: storctl_api::Error,
    },

    /// The vendor accepted the request but refused the change.
    #[error("{message}")]
    Rejected { message: String },

    // ── Transient unavailability ─────────────────────────────────────
    #[error("{message} (gave up after {attempts} attempts)")]
    Unavailable { attempts: u32, message: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap an API error with a description of the failed action.
    pub fn remote(action: impl Into<String>) -> impl FnOnce(storctl_api::Error) -> Self {
        let action = action.into();
        move |source| Self::Remote { action, source }
    }

    /// `true` for failures detected before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<storctl_api::Error> for CoreError {
    fn from(err: storctl_api::Error) -> Self {
        match err {
            storctl_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            storctl_api::Error::Transport(e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Remote {
                        action: "request failed".into(),
                        source: storctl_api::Error::Transport(e),
                    }
                }
            }
            storctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            storctl_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            other if other.is_not_found() => CoreError::NotFound {
                entity_type: "resource".into(),
                message: other.to_string(),
            },
            other => CoreError::Remote {
                action: "request failed".into(),
                source: other,
            },
        }
    }
}
