//! Shared configuration for the `storctl` binary.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext) and
//! translation of a profile into module connection arguments. Explicit
//! module arguments always win over what a profile supplies.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use storctl_core::ModuleKind;

/// Service name for keyring entries.
pub const KEYRING_SERVICE: &str = "storctl";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named storage-system profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_validate_certs")]
    pub validate_certs: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            validate_certs: default_validate_certs(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_validate_certs() -> bool {
    true
}
fn default_timeout() -> u64 {
    60
}

/// A named storage-system profile.
///
/// One profile can carry both an ONTAP endpoint (`hostname`) and an
/// E-Series endpoint (`api_url`); each module reads the half it needs.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// ONTAP cluster or vserver management address.
    pub hostname: Option<String>,

    /// Use HTTPS for ZAPI.
    pub https: Option<bool>,

    /// Override the ZAPI port.
    pub http_port: Option<u16>,

    /// Default vserver for ONTAP modules.
    pub vserver: Option<String>,

    /// SANtricity REST root (e.g., "https://10.1.1.1:8443/devmgr/v2").
    pub api_url: Option<String>,

    /// E-Series storage-system id.
    pub ssid: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override certificate validation.
    pub validate_certs: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "storctl", "storctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("storctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + `STORCTL_*` environment variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STORCTL_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Name of the profile to use: explicit flag, then `default_profile`.
pub fn active_profile_name(config: &Config, flag: Option<&str>) -> String {
    flag.map(String::from)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up a profile; a missing profile is only an error when it was
/// asked for by name.
pub fn select_profile<'a>(
    config: &'a Config,
    flag: Option<&str>,
) -> Result<Option<(String, &'a Profile)>, ConfigError> {
    let name = active_profile_name(config, flag);
    match config.profiles.get(&name) {
        Some(profile) => Ok(Some((name, profile))),
        None if flag.is_some() => Err(ConfigError::UnknownProfile { name }),
        None => Ok(None),
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Resolve a profile's password.
///
/// Order: `password_env` → `STORCTL_PASSWORD` → system keyring →
/// plaintext `password`.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(pw) = std::env::var("STORCTL_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Profile → module arguments ──────────────────────────────────────

/// Connection arguments a profile supplies to `kind`.
///
/// Keys follow the module's own parameter names, so the result can be
/// merged under an invocation's explicit arguments. Unset profile fields
/// are left out; a missing password is left to module validation.
pub fn profile_module_args(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    kind: ModuleKind,
) -> Result<Map<String, Value>, ConfigError> {
    let mut args = Map::new();
    let validate_certs = profile.validate_certs.unwrap_or(defaults.validate_certs);
    let password = resolve_password(profile, profile_name).ok();

    let mut put = |key: &str, value: Option<Value>| {
        if let Some(value) = value {
            args.insert(key.to_owned(), value);
        }
    };

    match kind {
        ModuleKind::CifsServer => {
            put("hostname", profile.hostname.clone().map(Value::from));
            put("username", profile.username.clone().map(Value::from));
            put(
                "password",
                password.map(|pw| Value::from(pw.expose_secret())),
            );
            put("https", profile.https.map(Value::from));
            put("http_port", profile.http_port.map(Value::from));
            put("vserver", profile.vserver.clone().map(Value::from));
            put("validate_certs", Some(Value::from(validate_certs)));
        }
        ModuleKind::MgmtInterface => {
            if let Some(ref api_url) = profile.api_url {
                url::Url::parse(api_url).map_err(|e| ConfigError::Validation {
                    field: "api_url".into(),
                    reason: format!("{api_url}: {e}"),
                })?;
            }
            put("api_url", profile.api_url.clone().map(Value::from));
            put("api_username", profile.username.clone().map(Value::from));
            put(
                "api_password",
                password.map(|pw| Value::from(pw.expose_secret())),
            );
            put("ssid", profile.ssid.clone().map(Value::from));
            put("validate_certs", Some(Value::from(validate_certs)));
        }
        ModuleKind::GroupMembership => {}
    }
    Ok(args)
}

/// Request timeout for a profile, falling back to the global default.
pub fn profile_timeout(profile: Option<&Profile>, defaults: &Defaults) -> Duration {
    Duration::from_secs(
        profile
            .and_then(|p| p.timeout)
            .unwrap_or(defaults.timeout),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "yaml"
timeout = 20

[profiles.lab]
hostname = "cluster1.lab"
https = true
vserver = "svm1"
username = "admin"
password = "plain-secret"

[profiles.array]
api_url = "https://10.1.1.1:8443/devmgr/v2"
ssid = "1"
username = "rw"
password = "rw-secret"
validate_certs = false
timeout = 90
"#;

    fn sample() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = load_config_from(&path).unwrap();
        (dir, config)
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let (_dir, config) = sample();
        assert_eq!(config.default_profile.as_deref(), Some("lab"));
        assert_eq!(config.defaults.output, "yaml");
        assert_eq!(config.defaults.timeout, 20);
        assert!(config.defaults.validate_certs);
        assert_eq!(config.profiles.len(), 2);
        assert_eq!(config.profiles["lab"].vserver.as_deref(), Some("svm1"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.output, "json");
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let (dir, mut config) = sample();
        config.profiles.insert(
            "edge".into(),
            Profile {
                hostname: Some("edge.lab".into()),
                ..Profile::default()
            },
        );
        let path = dir.path().join("nested").join("config.toml");
        save_config_to(&config, &path).unwrap();

        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.profiles.len(), 3);
        assert_eq!(
            reloaded.profiles["edge"].hostname.as_deref(),
            Some("edge.lab")
        );
    }

    #[test]
    fn profile_selection() {
        let (_dir, config) = sample();
        let (name, profile) = select_profile(&config, None).unwrap().unwrap();
        assert_eq!(name, "lab");
        assert_eq!(profile.hostname.as_deref(), Some("cluster1.lab"));

        assert!(matches!(
            select_profile(&config, Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));
        assert!(select_profile(&Config::default(), None).unwrap().is_none());
    }

    #[test]
    fn ontap_args_from_profile() {
        let (_dir, config) = sample();
        let profile = &config.profiles["lab"];
        let args =
            profile_module_args(profile, "lab", &config.defaults, ModuleKind::CifsServer).unwrap();
        assert_eq!(args["hostname"], "cluster1.lab");
        assert_eq!(args["https"], true);
        assert_eq!(args["vserver"], "svm1");
        assert_eq!(args["validate_certs"], true);
        assert!(args.get("http_port").is_none());
        assert!(args.get("api_url").is_none());
    }

    #[test]
    fn eseries_args_from_profile() {
        let (_dir, config) = sample();
        let profile = &config.profiles["array"];
        let args =
            profile_module_args(profile, "array", &config.defaults, ModuleKind::MgmtInterface)
                .unwrap();
        assert_eq!(args["api_url"], "https://10.1.1.1:8443/devmgr/v2");
        assert_eq!(args["api_username"], "rw");
        assert_eq!(args["ssid"], "1");
        assert_eq!(args["validate_certs"], false);
        assert_eq!(
            profile_timeout(Some(profile), &config.defaults),
            Duration::from_secs(90)
        );
        assert_eq!(
            profile_timeout(None, &config.defaults),
            Duration::from_secs(20)
        );
    }

    #[test]
    fn bad_api_url_is_rejected() {
        let profile = Profile {
            api_url: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_module_args(
            &profile,
            "bad",
            &Defaults::default(),
            ModuleKind::MgmtInterface,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let var = "STORCTL_TEST_UNSET_PASSWORD_VAR";
        let profile = Profile {
            password_env: Some(var.into()),
            password: Some("from-file".into()),
            ..Profile::default()
        };
        // Only meaningful when nothing earlier in the chain is set.
        if std::env::var(var).is_err() && std::env::var("STORCTL_PASSWORD").is_err() {
            let pw = resolve_password(&profile, "storctl-test-no-keyring").unwrap();
            assert_eq!(pw.expose_secret(), "from-file");
        }
    }

    #[test]
    fn no_password_anywhere_is_an_error() {
        if std::env::var("STORCTL_PASSWORD").is_err() {
            let err = resolve_password(&Profile::default(), "storctl-test-no-keyring").unwrap_err();
            assert!(matches!(err, ConfigError::NoCredentials { .. }));
        }
    }
}
