// ZAPI CIFS server calls
//
// `cifs-server-*` family. All calls tunnel to the client's vserver,
// since a CIFS server is a per-vserver object.

use tracing::debug;

use crate::error::Error;
use crate::zapi::client::ZapiClient;
use crate::zapi::element::NaElement;

/// Observed state of a CIFS server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CifsServerInfo {
    pub cifs_server: String,
    /// `up` or `down` as reported by ONTAP.
    pub administrative_status: Option<String>,
    pub domain: Option<String>,
    pub workgroup: Option<String>,
}

/// Payload for `cifs-server-create`.
#[derive(Debug, Clone, Default)]
pub struct CifsServerCreate {
    pub cifs_server: String,
    pub administrative_status: String,
    pub workgroup: Option<String>,
    pub domain: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl CifsServerCreate {
    fn to_element(&self) -> NaElement {
        let mut el = NaElement::with_children(
            "cifs-server-create",
            [
                ("cifs-server", self.cifs_server.as_str()),
                ("administrative-status", self.administrative_status.as_str()),
            ],
        );
        let optional = [
            ("workgroup", &self.workgroup),
            ("domain", &self.domain),
            ("admin-username", &self.admin_username),
            ("admin-password", &self.admin_password),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                el.add_new_child(key, value.as_str());
            }
        }
        el
    }
}

impl ZapiClient {
    /// Look up a CIFS server by name.
    ///
    /// `cifs-server-get-iter` with a `cifs-server-config` query. Returns
    /// `None` when `num-records` is absent or zero.
    pub async fn get_cifs_server(&self, name: &str) -> Result<Option<CifsServerInfo>, Error> {
        let mut query = NaElement::new("query");
        query.add_child(NaElement::with_children(
            "cifs-server-config",
            [("cifs-server", name)],
        ));
        let mut request = NaElement::new("cifs-server-get-iter");
        request.add_child(query);

        debug!(name, "fetching cifs server");
        let result = self.invoke(&request, true).await?;

        let records: u64 = result
            .child_content("num-records")
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(0);
        if records == 0 {
            return Ok(None);
        }

        let config = result
            .child("attributes-list")
            .and_then(|list| list.child("cifs-server-config"))
            .ok_or_else(|| Error::Xml("num-records > 0 but no cifs-server-config".into()))?;

        Ok(Some(CifsServerInfo {
            cifs_server: config
                .child_content("cifs-server")
                .unwrap_or(name)
                .to_owned(),
            administrative_status: config.child_content("administrative-status").map(String::from),
            domain: config.child_content("domain").map(String::from),
            workgroup: config.child_content("workgroup").map(String::from),
        }))
    }

    /// `cifs-server-create`
    pub async fn create_cifs_server(&self, request: &CifsServerCreate) -> Result<(), Error> {
        debug!(name = %request.cifs_server, status = %request.administrative_status, "creating cifs server");
        self.invoke(&request.to_element(), true).await?;
        Ok(())
    }

    /// `cifs-server-modify`, setting only the administrative status.
    pub async fn modify_cifs_server_status(
        &self,
        name: &str,
        vserver: &str,
        administrative_status: &str,
    ) -> Result<(), Error> {
        debug!(name, administrative_status, "modifying cifs server");
        let request = NaElement::with_children(
            "cifs-server-modify",
            [
                ("cifs-server", name),
                ("administrative-status", administrative_status),
                ("vserver", vserver),
            ],
        );
        self.invoke(&request, true).await?;
        Ok(())
    }

    /// `cifs-server-delete`
    pub async fn delete_cifs_server(&self) -> Result<(), Error> {
        debug!("deleting cifs server");
        self.invoke(&NaElement::new("cifs-server-delete"), true).await?;
        Ok(())
    }

    /// `cifs-server-start`
    pub async fn start_cifs_server(&self) -> Result<(), Error> {
        debug!("starting cifs server");
        self.invoke(&NaElement::new("cifs-server-start"), true).await?;
        Ok(())
    }

    /// `cifs-server-stop`
    pub async fn stop_cifs_server(&self) -> Result<(), Error> {
        debug!("stopping cifs server");
        self.invoke(&NaElement::new("cifs-server-stop"), true).await?;
        Ok(())
    }
}
