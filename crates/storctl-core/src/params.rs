// ── Shared connection arguments ──
//
// Every ONTAP module takes the same host/credential block, and every
// E-Series module the same API block. These are flattened into the
// module parameter structs and turned into clients here.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use storctl_api::zapi::zapi_url;
use storctl_api::{EseriesClient, TlsMode, TransportConfig, ZapiClient};

use crate::error::CoreError;
use crate::invocation::de;

/// Parameter names contributed by [`OntapHostArgs`], aliases included.
pub const ONTAP_HOST_PARAMETERS: &[&str] = &[
    "hostname",
    "username",
    "user",
    "password",
    "pass",
    "https",
    "validate_certs",
    "http_port",
];

/// Parameter names contributed by [`EseriesHostArgs`].
pub const ESERIES_HOST_PARAMETERS: &[&str] = &[
    "api_url",
    "api_username",
    "api_password",
    "ssid",
    "validate_certs",
];

fn default_true() -> bool {
    true
}

fn default_ssid() -> String {
    "1".into()
}

// ── ONTAP ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct OntapHostArgs {
    #[serde(deserialize_with = "de::string")]
    pub hostname: String,

    #[serde(alias = "user", deserialize_with = "de::string")]
    pub username: String,

    #[serde(alias = "pass", deserialize_with = "de::secret")]
    pub password: SecretString,

    #[serde(default, deserialize_with = "de::bool")]
    pub https: bool,

    #[serde(default = "default_true", deserialize_with = "de::bool")]
    pub validate_certs: bool,

    #[serde(default, deserialize_with = "de::opt_u16")]
    pub http_port: Option<u16>,

    /// CA bundle from the CLI profile; not a module parameter.
    #[serde(skip)]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl OntapHostArgs {
    pub fn transport(&self) -> TransportConfig {
        let transport = TransportConfig {
            tls: TlsMode::from_validate_certs(self.validate_certs, self.ca_cert.clone()),
            ..TransportConfig::default()
        };
        match self.timeout {
            Some(timeout) => transport.with_timeout(timeout),
            None => transport,
        }
    }

    /// Build a ZAPI client, tunnelled to `vserver` when given.
    pub fn zapi_client(&self, vserver: Option<&str>) -> Result<ZapiClient, CoreError> {
        let url = zapi_url(&self.hostname, self.https, self.http_port)?;
        Ok(ZapiClient::new(
            url,
            self.username.clone(),
            self.password.clone(),
            vserver.map(String::from),
            &self.transport(),
        )?)
    }
}

// ── E-Series ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct EseriesHostArgs {
    #[serde(deserialize_with = "de::string")]
    pub api_url: String,

    #[serde(deserialize_with = "de::string")]
    pub api_username: String,

    #[serde(deserialize_with = "de::secret")]
    pub api_password: SecretString,

    #[serde(default = "default_ssid", deserialize_with = "de::string")]
    pub ssid: String,

    #[serde(default = "default_true", deserialize_with = "de::bool")]
    pub validate_certs: bool,

    #[serde(skip)]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl EseriesHostArgs {
    pub fn transport(&self) -> TransportConfig {
        let transport = TransportConfig {
            tls: TlsMode::from_validate_certs(self.validate_certs, self.ca_cert.clone()),
            ..TransportConfig::default()
        };
        match self.timeout {
            Some(timeout) => transport.with_timeout(timeout),
            None => transport,
        }
    }

    pub fn eseries_client(&self) -> Result<EseriesClient, CoreError> {
        Ok(EseriesClient::new(
            &self.api_url,
            self.ssid.clone(),
            self.api_username.clone(),
            self.api_password.clone(),
            &self.transport(),
        )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    #[test]
    fn ontap_aliases_and_defaults() {
        let args: OntapHostArgs = serde_json::from_value(json!({
            "hostname": "10.0.0.5",
            "user": "admin",
            "pass": "netapp1!",
        }))
        .unwrap();
        assert_eq!(args.username, "admin");
        assert_eq!(args.password.expose_secret(), "netapp1!");
        assert!(!args.https);
        assert!(args.validate_certs);

        let client = args.zapi_client(Some("svm1")).unwrap();
        assert_eq!(
            client.url().as_str(),
            "http://10.0.0.5/servlets/netapp.servlets.admin.XMLrequest_filer"
        );
        assert_eq!(client.vserver(), Some("svm1"));
    }

    #[test]
    fn eseries_defaults_ssid_and_coerces_validate_certs() {
        let args: EseriesHostArgs = serde_json::from_value(json!({
            "api_url": "https://10.1.1.1:8443/devmgr/v2",
            "api_username": "admin",
            "api_password": "pw",
            "validate_certs": "no",
        }))
        .unwrap();
        assert_eq!(args.ssid, "1");
        assert!(!args.validate_certs);
        assert_eq!(args.transport().tls, TlsMode::DangerAcceptInvalid);
    }
}
