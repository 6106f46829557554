use thiserror::Error;

/// Top-level error type for the `storctl-api` crate.
///
/// Covers every failure mode across both API surfaces: transport,
/// ZAPI (XML envelope + vendor errno) and E-Series REST (HTTP status).
/// `storctl-core` maps these into module-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected (HTTP 401 or a ZAPI auth failure).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success HTTP status with the (truncated) response body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── ZAPI ────────────────────────────────────────────────────────
    /// `<results status="failed" errno="..." reason="..."/>`
    #[error("NetApp API failed. Reason - {errno}:{reason}")]
    Zapi { errno: String, reason: String },

    /// Malformed XML on either side of the wire.
    #[error("XML error: {0}")]
    Xml(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for HTTP 424: the storage system reports itself as
    /// offline, usually right after a network reconfiguration.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Http { status: 424, .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            other => other.is_unavailable(),
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }
}

/// Truncate a response body for inclusion in error messages.
pub(crate) fn preview(body: &str) -> String {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_424_is_unavailable_and_transient() {
        let err = Error::Http {
            status: 424,
            body: String::new(),
        };
        assert!(err.is_unavailable());
        assert!(err.is_transient());
    }

    #[test]
    fn zapi_error_exposes_errno() {
        let err = Error::Zapi {
            errno: "15661".into(),
            reason: "entry doesn't exist".into(),
        };
        assert!(matches!(&err, Error::Zapi { errno, .. } if errno == "15661"));
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "NetApp API failed. Reason - 15661:entry doesn't exist"
        );
    }

    #[test]
    fn http_404_is_not_found() {
        let err = Error::Http {
            status: 404,
            body: "{}".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let p = preview(&body);
        assert!(p.len() <= 200);
        assert!(p.chars().all(|c| c == 'é'));
    }
}
