// ZAPI HTTP client
//
// Wraps `reqwest::Client` with the ZAPI envelope: every request is a
// `<netapp>` document POSTed to the filer servlet, every response is a
// `<netapp><results status="...">` document. Vendor failures are lifted
// into `Error::Zapi` before the caller sees them.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, preview};
use crate::transport::TransportConfig;
use crate::zapi::element::NaElement;

/// Path of the ZAPI servlet on every ONTAP node / cluster LIF.
pub const ZAPI_SERVLET_PATH: &str = "/servlets/netapp.servlets.admin.XMLrequest_filer";

/// ONTAPI version advertised in the request envelope.
pub const ZAPI_VERSION: (u32, u32) = (1, 110);

const XML_PROLOGUE: &str = "<?xml version='1.0' encoding='utf-8'?>\n\
    <!DOCTYPE netapp SYSTEM 'file:/etc/netapp_filer.dtd'>\n";
const ZAPI_NAMESPACE: &str = "http://www.netapp.com/filer/admin";

/// Build the servlet URL for an ONTAP host.
///
/// `port` defaults to 443 with `https`, 80 without.
pub fn zapi_url(hostname: &str, https: bool, port: Option<u16>) -> Result<Url, Error> {
    let (scheme, default_port) = if https { ("https", 443) } else { ("http", 80) };
    let port = port.unwrap_or(default_port);
    let url = Url::parse(&format!("{scheme}://{hostname}:{port}"))?;
    Ok(url.join(ZAPI_SERVLET_PATH)?)
}

/// Raw ZAPI client bound to one cluster (and optionally one vserver).
///
/// All methods return the unwrapped `<results>` element; the `<netapp>`
/// envelope and the pass/fail status are handled here.
pub struct ZapiClient {
    http: reqwest::Client,
    url: Url,
    username: String,
    password: SecretString,
    vserver: Option<String>,
}

impl ZapiClient {
    /// Create a new ZAPI client from a `TransportConfig`.
    pub fn new(
        url: Url,
        username: String,
        password: SecretString,
        vserver: Option<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, url, username, password, vserver))
    }

    /// Create a ZAPI client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        url: Url,
        username: String,
        password: SecretString,
        vserver: Option<String>,
    ) -> Self {
        Self {
            http,
            url,
            username,
            password,
            vserver,
        }
    }

    /// The servlet URL requests are sent to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The vserver requests are tunnelled to, if any.
    pub fn vserver(&self) -> Option<&str> {
        self.vserver.as_deref()
    }

    /// Wrap a request in the `<netapp>` envelope.
    ///
    /// With `enable_tunneling` and a configured vserver, the request is
    /// executed in that vserver's context via the `vfiler` attribute.
    pub(crate) fn envelope(&self, request: &NaElement, enable_tunneling: bool) -> Result<String, Error> {
        let mut netapp = NaElement::new("netapp");
        let (major, minor) = ZAPI_VERSION;
        netapp.set_attr("version", format!("{major}.{minor}"));
        netapp.set_attr("xmlns", ZAPI_NAMESPACE);
        if enable_tunneling {
            if let Some(vserver) = &self.vserver {
                netapp.set_attr("vfiler", vserver.as_str());
            }
        }
        netapp.add_child(request.clone());
        Ok(format!("{XML_PROLOGUE}{}", netapp.to_xml()?))
    }

    /// Invoke a ZAPI call and return its `<results>` element.
    ///
    /// Fails with `Error::Zapi` when the results status is not `passed`.
    pub async fn invoke(&self, request: &NaElement, enable_tunneling: bool) -> Result<NaElement, Error> {
        let body = self.envelope(request, enable_tunneling)?;
        debug!(api = request.name(), url = %self.url, "POST zapi");
        trace!(%body, "zapi request");

        let resp = self
            .http
            .post(self.url.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=\"UTF-8\"")
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: format!("invalid credentials for user '{}'", self.username),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&text),
            });
        }
        trace!(body = %text, "zapi response");

        Self::unwrap_results(&text)
    }

    fn unwrap_results(text: &str) -> Result<NaElement, Error> {
        let root = NaElement::parse(text)?;
        let results = root
            .child("results")
            .ok_or_else(|| Error::Xml(format!("missing <results> in response: {}", preview(text))))?;

        match results.attr("status") {
            Some("passed") => Ok(results.clone()),
            _ => Err(Error::Zapi {
                errno: results.attr("errno").unwrap_or("unknown").to_owned(),
                reason: results.attr("reason").unwrap_or_default().to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(vserver: Option<&str>) -> ZapiClient {
        ZapiClient::with_client(
            reqwest::Client::new(),
            zapi_url("cluster1", true, None).unwrap(),
            "admin".into(),
            SecretString::from("secret".to_owned()),
            vserver.map(String::from),
        )
    }

    #[test]
    fn url_uses_scheme_default_ports() {
        assert_eq!(
            zapi_url("10.0.0.1", false, None).unwrap().as_str(),
            "http://10.0.0.1/servlets/netapp.servlets.admin.XMLrequest_filer"
        );
        assert_eq!(
            zapi_url("cluster1", true, Some(8443)).unwrap().as_str(),
            "https://cluster1:8443/servlets/netapp.servlets.admin.XMLrequest_filer"
        );
    }

    #[test]
    fn tunnelling_sets_vfiler() {
        let request = NaElement::new("cifs-server-start");
        let body = client(Some("svm1")).envelope(&request, true).unwrap();
        assert!(body.contains("vfiler=\"svm1\""));
        assert!(body.contains("<cifs-server-start></cifs-server-start>"));

        let untunnelled = client(Some("svm1")).envelope(&request, false).unwrap();
        assert!(!untunnelled.contains("vfiler"));
    }

    #[test]
    fn failed_results_become_zapi_errors() {
        let err = ZapiClient::unwrap_results(
            r#"<netapp><results status="failed" errno="13005" reason="Unable to find API"/></netapp>"#,
        )
        .unwrap_err();
        match err {
            Error::Zapi { errno, reason } => {
                assert_eq!(errno, "13005");
                assert_eq!(reason, "Unable to find API");
            }
            other => panic!("expected Zapi error, got {other:?}"),
        }
    }
}
