//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use storctl_config::ConfigError;
use storctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(storctl::connection_failed),
        help(
            "Check that the storage system is reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(storctl::unavailable),
        help("The storage system kept answering 424 (offline). Retry once it is back.")
    )]
    Unavailable { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(storctl::timeout),
        help("Increase the timeout with --timeout or in your profile.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(storctl::auth_failed),
        help(
            "Verify the username and password.\n\
             Run: storctl config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(storctl::no_credentials),
        help(
            "Configure credentials with: storctl config init\n\
             Or set STORCTL_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Module outcome ───────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(storctl::not_found))]
    NotFound { entity_type: String, message: String },

    #[error("{message}")]
    #[diagnostic(code(storctl::module_failed))]
    ModuleFailed { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(storctl::permission),
        help("Run from an elevated (Administrator) shell.")
    )]
    PermissionDenied { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(storctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(storctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: storctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(storctl::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(storctl::json), help("Check the JSON document and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Unavailable { .. } | Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "parameters".into(),
                reason: message,
            },

            CoreError::NotFound {
                entity_type,
                message,
            } => CliError::NotFound {
                entity_type,
                message,
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "<name>".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Unavailable { .. } => CliError::Unavailable {
                message: err.to_string(),
            },

            CoreError::Rejected { ref message } if message.contains("Access is denied") => {
                CliError::PermissionDenied {
                    message: message.clone(),
                }
            }

            CoreError::Remote { .. } | CoreError::Rejected { .. } | CoreError::Internal(_) => {
                CliError::ModuleFailed {
                    message: err.to_string(),
                }
            }

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
