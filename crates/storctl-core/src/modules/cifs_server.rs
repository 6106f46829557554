// ── na_ontap_cifs_server ──
//
// Ensures a CIFS server exists on a vserver with the requested
// administrative state, or is removed.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use storctl_api::zapi::{CifsServerCreate, CifsServerInfo, EmsEvent, ZapiClient};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::invocation::{ModuleInvocation, de};
use crate::params::{ONTAP_HOST_PARAMETERS, OntapHostArgs};

pub const MODULE_NAME: &str = "na_ontap_cifs_server";

const MODULE_PARAMETERS: &[&str] = &[
    "state",
    "service_state",
    "cifs_server_name",
    "vserver",
    "workgroup",
    "domain",
    "admin_user_name",
    "admin_password",
];

// ── Parameters ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Started,
    Stopped,
}

impl ServiceState {
    /// ONTAP `administrative-status` value for this state.
    pub fn administrative_status(self) -> &'static str {
        match self {
            Self::Started => "up",
            Self::Stopped => "down",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CifsServerParams {
    #[serde(flatten)]
    pub host: OntapHostArgs,

    #[serde(default)]
    pub state: State,

    #[serde(default)]
    pub service_state: Option<ServiceState>,

    #[serde(deserialize_with = "de::string")]
    pub cifs_server_name: String,

    #[serde(deserialize_with = "de::string")]
    pub vserver: String,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub workgroup: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub domain: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub admin_user_name: Option<String>,

    #[serde(default, deserialize_with = "de::opt_secret")]
    pub admin_password: Option<SecretString>,
}

impl CifsServerParams {
    pub fn supported_parameters() -> Vec<&'static str> {
        [ONTAP_HOST_PARAMETERS, MODULE_PARAMETERS].concat()
    }

    pub fn from_invocation(invocation: &ModuleInvocation) -> Result<Self, CoreError> {
        invocation.parse(MODULE_NAME, &Self::supported_parameters())
    }

    fn create_request(&self) -> CifsServerCreate {
        // Without an explicit service_state the server is created stopped.
        let status = self
            .service_state
            .unwrap_or(ServiceState::Stopped)
            .administrative_status();
        CifsServerCreate {
            cifs_server: self.cifs_server_name.clone(),
            administrative_status: status.into(),
            workgroup: self.workgroup.clone(),
            domain: self.domain.clone(),
            admin_username: self.admin_user_name.clone(),
            admin_password: self
                .admin_password
                .as_ref()
                .map(|p| p.expose_secret().to_owned()),
        }
    }
}

// ── Planning ────────────────────────────────────────────────────────

/// The single write a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CifsAction {
    Create,
    Start,
    Stop,
    /// Delete, stopping the server first when it is running.
    Delete { stop_first: bool },
}

/// Decide what to do given the observed server, if any.
pub fn plan(params: &CifsServerParams, current: Option<&CifsServerInfo>) -> Option<CifsAction> {
    match (params.state, current) {
        (State::Present, None) => Some(CifsAction::Create),
        (State::Present, Some(info)) => {
            let status = info.administrative_status.as_deref();
            match (params.service_state, status) {
                (Some(ServiceState::Started), Some("down")) => Some(CifsAction::Start),
                (Some(ServiceState::Stopped), Some("up")) => Some(CifsAction::Stop),
                _ => None,
            }
        }
        (State::Absent, Some(info)) => Some(CifsAction::Delete {
            stop_first: info.administrative_status.as_deref() == Some("up"),
        }),
        (State::Absent, None) => None,
    }
}

// ── Execution ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CifsServerOutcome {
    pub changed: bool,
}

pub struct CifsServerTask {
    params: CifsServerParams,
    client: ZapiClient,
}

impl CifsServerTask {
    pub fn new(params: CifsServerParams) -> Result<Self, CoreError> {
        let client = params.host.zapi_client(Some(&params.vserver))?;
        Ok(Self { params, client })
    }

    pub fn with_client(params: CifsServerParams, client: ZapiClient) -> Self {
        Self { params, client }
    }

    pub async fn apply(&self, check_mode: bool) -> Result<CifsServerOutcome, CoreError> {
        let name = &self.params.cifs_server_name;

        self.client
            .ems_log_event(&EmsEvent::setup(MODULE_NAME))
            .await
            .map_err(CoreError::remote("Error logging EMS event"))?;

        let current = self
            .client
            .get_cifs_server(name)
            .await
            .map_err(CoreError::remote(format!("Error fetching CIFS server {name}")))?;
        debug!(name, exists = current.is_some(), "observed cifs server");

        let Some(action) = plan(&self.params, current.as_ref()) else {
            return Ok(CifsServerOutcome { changed: false });
        };

        if check_mode {
            info!(name, ?action, "check mode, skipping write");
        } else {
            self.execute(action).await?;
        }
        Ok(CifsServerOutcome { changed: true })
    }

    async fn execute(&self, action: CifsAction) -> Result<(), CoreError> {
        let name = &self.params.cifs_server_name;
        info!(name, ?action, "applying cifs server change");
        match action {
            CifsAction::Create => self
                .client
                .create_cifs_server(&self.params.create_request())
                .await
                .map_err(CoreError::remote(format!("Error creating CIFS server {name}"))),
            CifsAction::Start => self
                .client
                .start_cifs_server()
                .await
                .map_err(CoreError::remote(format!("Error modifying CIFS server {name}"))),
            CifsAction::Stop => self
                .client
                .stop_cifs_server()
                .await
                .map_err(CoreError::remote(format!("Error modifying CIFS server {name}"))),
            CifsAction::Delete { stop_first } => {
                if stop_first {
                    self.client
                        .modify_cifs_server_status(name, &self.params.vserver, "down")
                        .await
                        .map_err(CoreError::remote(format!("Error modifying CIFS server {name}")))?;
                }
                self.client
                    .delete_cifs_server()
                    .await
                    .map_err(CoreError::remote(format!("Error deleting CIFS server {name}")))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(extra: serde_json::Value) -> CifsServerParams {
        let mut args = json!({
            "hostname": "10.0.0.5",
            "username": "admin",
            "password": "netapp1!",
            "cifs_server_name": "data2",
            "vserver": "svm1",
        });
        if let (Some(base), Some(extra)) = (args.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        let invocation = ModuleInvocation::from_json_str(&args.to_string()).unwrap();
        CifsServerParams::from_invocation(&invocation).unwrap()
    }

    fn observed(status: &str) -> CifsServerInfo {
        CifsServerInfo {
            cifs_server: "DATA2".into(),
            administrative_status: Some(status.into()),
            domain: None,
            workgroup: None,
        }
    }

    #[test]
    fn missing_server_is_created() {
        let p = params(json!({ "service_state": "started" }));
        assert_eq!(plan(&p, None), Some(CifsAction::Create));
        assert_eq!(p.create_request().administrative_status, "up");
    }

    #[test]
    fn create_defaults_to_down() {
        let p = params(json!({}));
        assert_eq!(p.create_request().administrative_status, "down");
    }

    #[test]
    fn service_state_transitions() {
        let started = params(json!({ "service_state": "started" }));
        assert_eq!(plan(&started, Some(&observed("down"))), Some(CifsAction::Start));
        assert_eq!(plan(&started, Some(&observed("up"))), None);

        let stopped = params(json!({ "service_state": "stopped" }));
        assert_eq!(plan(&stopped, Some(&observed("up"))), Some(CifsAction::Stop));
        assert_eq!(plan(&stopped, Some(&observed("down"))), None);

        let unspecified = params(json!({}));
        assert_eq!(plan(&unspecified, Some(&observed("up"))), None);
    }

    #[test]
    fn absent_deletes_whatever_the_status() {
        let p = params(json!({ "state": "absent" }));
        assert_eq!(
            plan(&p, Some(&observed("up"))),
            Some(CifsAction::Delete { stop_first: true })
        );
        assert_eq!(
            plan(&p, Some(&observed("down"))),
            Some(CifsAction::Delete { stop_first: false })
        );
        assert_eq!(plan(&p, None), None);
    }

    #[test]
    fn name_is_required() {
        let invocation = ModuleInvocation::from_json_str(
            r#"{"hostname": "h", "username": "u", "password": "p", "vserver": "svm1"}"#,
        )
        .unwrap();
        let err = CifsServerParams::from_invocation(&invocation).unwrap_err();
        assert_eq!(err.to_string(), "missing required arguments: cifs_server_name");
    }

    #[test]
    fn invalid_choice_is_rejected() {
        let invocation = ModuleInvocation::from_json_str(
            r#"{"hostname": "h", "username": "u", "password": "p", "vserver": "svm1",
                "cifs_server_name": "data2", "service_state": "paused"}"#,
        )
        .unwrap();
        let err = CifsServerParams::from_invocation(&invocation).unwrap_err();
        assert!(err.is_validation());
    }
}
