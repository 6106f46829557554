//! CLI configuration: thin wrapper around `storctl_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--profile,
//! --insecure, --timeout) on top of the profile file.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value};

use storctl_core::ModuleKind;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use storctl_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    storctl_config::active_profile_name(config, global.profile.as_deref())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// What the active profile contributes to one module run.
#[derive(Debug, Default)]
pub struct ProfileContext {
    /// Connection arguments, overridden by explicit module arguments.
    pub args: Map<String, Value>,
    pub ca_cert: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

/// Resolve the profile for `kind`, applying global flag overrides.
///
/// Without a config file or profile this yields only the flag-derived
/// settings; modules then report any missing connection parameters.
pub fn resolve_profile(global: &GlobalOpts, kind: ModuleKind) -> Result<ProfileContext, CliError> {
    let cfg = load_config_or_default();
    let selected = storctl_config::select_profile(&cfg, global.profile.as_deref()).map_err(
        |err| match err {
            storctl_config::ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            },
            other => other.into(),
        },
    )?;

    let mut ctx = match selected {
        Some((name, profile)) => ProfileContext {
            args: storctl_config::profile_module_args(profile, &name, &cfg.defaults, kind)?,
            ca_cert: profile.ca_cert.clone(),
            timeout: Some(storctl_config::profile_timeout(Some(profile), &cfg.defaults)),
        },
        None => ProfileContext {
            timeout: Some(storctl_config::profile_timeout(None, &cfg.defaults)),
            ..ProfileContext::default()
        },
    };

    if let Some(secs) = global.timeout {
        ctx.timeout = Some(Duration::from_secs(secs));
    }
    Ok(ctx)
}
