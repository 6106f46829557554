// E-Series SANtricity REST client
//
// Wraps `reqwest::Client` with basic auth, `storage-systems/{ssid}/...`
// URL construction and JSON decoding. Callers that need to branch on a
// specific status (424 during a reconfiguration, 422 on an illegal
// parameter) use the `*_raw` variants, which return the status and body
// instead of failing.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::eseries::models::{ControllerInfo, EthernetInterface, InterfaceUpdate};
use crate::error::{Error, preview};
use crate::transport::TransportConfig;

/// Interface reconfiguration can block until the port comes back.
pub const UPDATE_TIMEOUT: Duration = Duration::from_secs(300);

/// Status code plus decoded body of a request that did not fail on status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed JSON, or a JSON string holding the raw text when the body
    /// isn't JSON.
    pub body: serde_json::Value,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-2xx response into `Error::Http`.
    pub fn into_result(self) -> Result<serde_json::Value, Error> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(Error::Http {
                status: self.status,
                body: preview(&self.body.to_string()),
            })
        }
    }
}

/// Raw HTTP client for one storage system behind a SANtricity endpoint.
pub struct EseriesClient {
    http: reqwest::Client,
    base_url: Url,
    ssid: String,
    username: String,
    password: SecretString,
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

impl EseriesClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `api_url` is the REST root (e.g. `https://10.1.1.1:8443/devmgr/v2`);
    /// a trailing slash is added when missing so relative joins keep the
    /// full path.
    pub fn new(
        api_url: &str,
        ssid: String,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, api_url, ssid, username, password)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        api_url: &str,
        ssid: String,
        username: String,
        password: SecretString,
    ) -> Result<Self, Error> {
        let base_url = if api_url.ends_with('/') {
            Url::parse(api_url)?
        } else {
            Url::parse(&format!("{api_url}/"))?
        };
        Ok(Self {
            http,
            base_url,
            ssid,
            username,
            password,
        })
    }

    /// The storage-system identifier requests are scoped to.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}storage-systems/{ssid}/{path}`
    pub(crate) fn storage_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self
            .base_url
            .join(&format!("storage-systems/{}/{path}", self.ssid))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn read_raw(resp: reqwest::Response) -> Result<RawResponse, Error> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "invalid API credentials".into(),
            });
        }
        let text = resp.text().await.map_err(Error::Transport)?;
        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };
        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// GET without failing on status.
    pub async fn get_raw(&self, path: &str) -> Result<RawResponse, Error> {
        let url = self.storage_url(path)?;
        debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .headers(json_headers())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::read_raw(resp).await
    }

    /// POST a JSON body without failing on status.
    pub async fn post_raw(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
        timeout: Option<Duration>,
    ) -> Result<RawResponse, Error> {
        let url = self.storage_url(path)?;
        debug!("POST {}", url);
        let mut builder = self
            .http
            .post(url)
            .headers(json_headers())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;
        Self::read_raw(resp).await
    }

    /// GET and decode, failing on any non-2xx status.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let body = self.get_raw(path).await?.into_result()?;
        serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.to_string(),
        })
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET storage-systems/{ssid}/controllers`
    pub async fn list_controllers(&self) -> Result<Vec<ControllerInfo>, Error> {
        debug!(ssid = %self.ssid, "listing controllers");
        self.get("controllers").await
    }

    /// `GET storage-systems/{ssid}/controllers`, returning the status.
    ///
    /// Used as a liveness probe: a 424 means the system is temporarily
    /// offline.
    pub async fn probe_controllers(&self) -> Result<RawResponse, Error> {
        self.get_raw("controllers").await
    }

    /// `GET storage-systems/{ssid}/configuration/ethernet-interfaces`
    pub async fn list_ethernet_interfaces(&self) -> Result<Vec<EthernetInterface>, Error> {
        debug!(ssid = %self.ssid, "listing ethernet interfaces");
        self.get("configuration/ethernet-interfaces").await
    }

    /// `POST storage-systems/{ssid}/configuration/ethernet-interfaces`
    ///
    /// Returns the raw response so callers can interpret 422 `retcode`s.
    pub async fn update_ethernet_interface(&self, update: &InterfaceUpdate) -> Result<RawResponse, Error> {
        debug!(interface = %update.interface_ref, "updating ethernet interface");
        self.post_raw("configuration/ethernet-interfaces", update, Some(UPDATE_TIMEOUT))
            .await
    }
}
