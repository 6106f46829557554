// ── netapp_e_mgmt_interface ──
//
// Configures one management port of an E-Series controller: IPv4
// enablement and addressing, DNS and NTP acquisition, and remote (ssh)
// access. The array may still be coming back from an earlier change, so
// the first request goes through the unavailability retry.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use storctl_api::eseries::{
    ControllerInfo, DnsAcquisition, DnsServer, EthernetInterface, InterfaceUpdate, NtpAcquisition,
    NtpServer,
};
use storctl_api::{EseriesClient, RawResponse};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::invocation::{ModuleInvocation, de};
use crate::params::{ESERIES_HOST_PARAMETERS, EseriesHostArgs};
use crate::retry::{RetryPolicy, retry_while_unavailable};

pub const MODULE_NAME: &str = "netapp_e_mgmt_interface";

pub const UPDATED_MESSAGE: &str = "The interface settings have been updated.";

const MODULE_PARAMETERS: &[&str] = &[
    "state",
    "enable_interface",
    "controller",
    "name",
    "port",
    "iface",
    "channel",
    "address",
    "subnet_mask",
    "gateway",
    "config_method",
    "dns_config_method",
    "dns_address",
    "dns_address_backup",
    "ntp_config_method",
    "ntp_address",
    "ntp_address_backup",
    "ssh",
    "log_path",
];

// ── Parameters ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InterfaceState {
    Present,
    Enable,
    Absent,
    Disable,
}

impl InterfaceState {
    pub fn enables(self) -> bool {
        matches!(self, Self::Present | Self::Enable)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Accepts the four state names, plus booleans for `enable_interface`.
fn interface_state<'de, D: Deserializer<'de>>(d: D) -> Result<Option<InterfaceState>, D::Error> {
    let value = Value::deserialize(d)?;
    let state = match &value {
        Value::String(s) => s.parse::<InterfaceState>().ok(),
        _ => None,
    };
    state
        .or_else(|| {
            de::parse_bool(&value).map(|enabled| {
                if enabled {
                    InterfaceState::Enable
                } else {
                    InterfaceState::Disable
                }
            })
        })
        .map(Some)
        .ok_or_else(|| {
            D::Error::custom(format!(
                "value of state must be one of: present, enable, absent, disable, got: {value}"
            ))
        })
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, Display,
)]
pub enum ControllerLabel {
    A,
    B,
}

impl ControllerLabel {
    fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMethod {
    Dhcp,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NtpConfigMethod {
    Disable,
    Dhcp,
    Static,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MgmtInterfaceParams {
    #[serde(flatten)]
    pub host: EseriesHostArgs,

    #[serde(default, alias = "enable_interface", deserialize_with = "interface_state")]
    pub state: Option<InterfaceState>,

    pub controller: ControllerLabel,

    #[serde(default, alias = "port", alias = "iface", deserialize_with = "de::opt_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "de::opt_u32")]
    pub channel: Option<u32>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub subnet_mask: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub gateway: Option<String>,

    #[serde(default)]
    pub config_method: Option<ConfigMethod>,

    #[serde(default)]
    pub dns_config_method: Option<ConfigMethod>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub dns_address: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub dns_address_backup: Option<String>,

    #[serde(default)]
    pub ntp_config_method: Option<NtpConfigMethod>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub ntp_address: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub ntp_address_backup: Option<String>,

    #[serde(default, deserialize_with = "de::opt_bool")]
    pub ssh: Option<bool>,

    /// Debug log file; the binary attaches it before the module runs.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub log_path: Option<String>,
}

/// How the port is identified on its controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    Name(String),
    Channel(u32),
}

impl std::fmt::Display for PortSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Channel(channel) => write!(f, "{channel}"),
        }
    }
}

fn require_if(
    condition: bool,
    key: &str,
    value: &str,
    required: &[(&str, bool)],
) -> Result<(), CoreError> {
    if !condition {
        return Ok(());
    }
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "{key} is {value} but all of the following are missing: {}",
            missing.join(", ")
        )))
    }
}

impl MgmtInterfaceParams {
    pub fn supported_parameters() -> Vec<&'static str> {
        [ESERIES_HOST_PARAMETERS, MODULE_PARAMETERS].concat()
    }

    /// Parse and validate; fails before any request is made.
    pub fn from_invocation(invocation: &ModuleInvocation) -> Result<Self, CoreError> {
        let params: Self = invocation.parse(MODULE_NAME, &Self::supported_parameters())?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.is_none() && self.channel.is_none() {
            return Err(CoreError::validation(
                "one of the following is required: name, channel",
            ));
        }

        if let Some(state) = self.state {
            require_if(
                state.enables(),
                "state",
                state.as_str(),
                &[("config_method", self.config_method.is_some())],
            )?;
        }
        require_if(
            self.config_method == Some(ConfigMethod::Static),
            "config_method",
            "static",
            &[
                ("address", self.address.is_some()),
                ("subnet_mask", self.subnet_mask.is_some()),
            ],
        )?;
        require_if(
            self.dns_config_method == Some(ConfigMethod::Static),
            "dns_config_method",
            "static",
            &[("dns_address", self.dns_address.is_some())],
        )?;
        require_if(
            self.ntp_config_method == Some(NtpConfigMethod::Static),
            "ntp_config_method",
            "static",
            &[("ntp_address", self.ntp_address.is_some())],
        )
    }

    pub fn port(&self) -> Option<PortSelector> {
        match (&self.name, self.channel) {
            (Some(name), _) => Some(PortSelector::Name(name.clone())),
            (None, Some(channel)) => Some(PortSelector::Channel(channel)),
            (None, None) => None,
        }
    }

    fn enable_interface(&self) -> Option<bool> {
        self.state.map(InterfaceState::enables)
    }

    fn dns_addresses(&self) -> Vec<String> {
        self.dns_address
            .iter()
            .chain(self.dns_address_backup.iter())
            .cloned()
            .collect()
    }

    fn ntp_addresses(&self) -> Vec<String> {
        self.ntp_address
            .iter()
            .chain(self.ntp_address_backup.iter())
            .cloned()
            .collect()
    }
}

// ── Lookup ──────────────────────────────────────────────────────────

/// Order controllers by slot; position 0 is `A`, 1 is `B`.
pub fn label_controllers(mut controllers: Vec<ControllerInfo>) -> Vec<ControllerInfo> {
    controllers.sort_by_key(|c| c.physical_location.slot);
    controllers
}

pub fn select_controller(
    controllers: Vec<ControllerInfo>,
    label: ControllerLabel,
) -> Option<ControllerInfo> {
    label_controllers(controllers).into_iter().nth(label.index())
}

/// The port on `controller_ref` matching `selector`.
pub fn find_interface<'a>(
    interfaces: &'a [EthernetInterface],
    controller_ref: &str,
    selector: &PortSelector,
) -> Option<&'a EthernetInterface> {
    interfaces
        .iter()
        .filter(|iface| iface.controller_ref == controller_ref)
        .find(|iface| match selector {
            PortSelector::Name(name) => iface.alias == *name || iface.interface_name == *name,
            PortSelector::Channel(channel) => iface.channel == *channel,
        })
}

// ── Diff ────────────────────────────────────────────────────────────

/// Build the update body and report whether any declared setting differs.
///
/// Only declared groups are written; each group contributes its fields
/// to the body whether or not it changed.
pub fn build_update(
    params: &MgmtInterfaceParams,
    controller: &ControllerInfo,
    iface: &EthernetInterface,
) -> (bool, InterfaceUpdate) {
    let mut update = false;
    let mut body = InterfaceUpdate {
        controller_ref: controller.controller_ref.clone(),
        interface_ref: iface.interface_ref.clone(),
        ..InterfaceUpdate::default()
    };

    if let Some(enable) = params.enable_interface() {
        update |= iface.ipv4_enabled != enable;
        body.ipv4_enabled = Some(enable);
    }

    match params.config_method {
        Some(ConfigMethod::Dhcp) => {
            update |= iface.ipv4_address_config_method != "configDhcp";
            body.ipv4_address_config_method = Some("configDhcp".into());
        }
        Some(ConfigMethod::Static) => {
            update |= iface.ipv4_address_config_method != "configStatic";
            body.ipv4_address_config_method = Some("configStatic".into());

            update |= iface.ipv4_address != params.address;
            body.ipv4_address.clone_from(&params.address);

            update |= iface.ipv4_subnet_mask != params.subnet_mask;
            body.ipv4_subnet_mask.clone_from(&params.subnet_mask);

            if params.gateway.is_some() && iface.ipv4_gateway_address != params.gateway {
                update = true;
            }
            body.ipv4_gateway_address.clone_from(&params.gateway);
        }
        None => {}
    }

    let dns = &iface.dns_properties.acquisition_properties;
    match params.dns_config_method {
        Some(ConfigMethod::Dhcp) => {
            update |= dns.dns_acquisition_type != "dhcp";
            body.dns_acquisition_descriptor = Some(DnsAcquisition {
                dns_acquisition_type: "dhcp".into(),
                dns_servers: Vec::new(),
            });
        }
        Some(ConfigMethod::Static) => {
            let desired = params.dns_addresses();
            let observed: Vec<Option<&str>> = dns
                .dns_servers
                .iter()
                .map(|s| s.ipv4_address.as_deref())
                .collect();
            let wanted: Vec<Option<&str>> = desired.iter().map(|a| Some(a.as_str())).collect();
            update |= dns.dns_acquisition_type != "stat" || observed != wanted;
            body.dns_acquisition_descriptor = Some(DnsAcquisition {
                dns_acquisition_type: "stat".into(),
                dns_servers: desired.into_iter().map(DnsServer::ipv4).collect(),
            });
        }
        None => {}
    }

    let ntp = &iface.ntp_properties.acquisition_properties;
    match params.ntp_config_method {
        Some(NtpConfigMethod::Disable) => {
            update |= ntp.ntp_acquisition_type != "disabled";
            body.ntp_acquisition_descriptor = Some(NtpAcquisition {
                ntp_acquisition_type: "disabled".into(),
                ntp_servers: Vec::new(),
            });
        }
        Some(NtpConfigMethod::Dhcp) => {
            update |= ntp.ntp_acquisition_type != "dhcp";
            body.ntp_acquisition_descriptor = Some(NtpAcquisition {
                ntp_acquisition_type: "dhcp".into(),
                ntp_servers: Vec::new(),
            });
        }
        Some(NtpConfigMethod::Static) => {
            let desired = params.ntp_addresses();
            let observed: Vec<Option<&str>> =
                ntp.ntp_servers.iter().map(NtpServer::ipv4_address).collect();
            let wanted: Vec<Option<&str>> = desired.iter().map(|a| Some(a.as_str())).collect();
            update |= ntp.ntp_acquisition_type != "stat" || observed != wanted;
            body.ntp_acquisition_descriptor = Some(NtpAcquisition {
                ntp_acquisition_type: "stat".into(),
                ntp_servers: desired.into_iter().map(NtpServer::ipv4).collect(),
            });
        }
        None => {}
    }

    if let Some(ssh) = params.ssh {
        update |= controller.network_settings.remote_access_enabled != ssh;
        body.enable_remote_access = Some(ssh);
    }

    (update, body)
}

/// `retcode` of a 422 that rejects a parameter combination.
fn is_illegal_param(body: &Value) -> bool {
    match &body["retcode"] {
        Value::String(code) => code == "4" || code == "illegalParam",
        Value::Number(code) => code.as_u64() == Some(4),
        _ => false,
    }
}

// ── Execution ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MgmtInterfaceOutcome {
    pub changed: bool,
    pub msg: String,
    pub enabled: bool,
}

pub struct MgmtInterfaceTask {
    params: MgmtInterfaceParams,
    client: EseriesClient,
    retry: RetryPolicy,
}

impl MgmtInterfaceTask {
    pub fn new(params: MgmtInterfaceParams) -> Result<Self, CoreError> {
        let client = params.host.eseries_client()?;
        Ok(Self::with_client(params, client))
    }

    pub fn with_client(params: MgmtInterfaceParams, client: EseriesClient) -> Self {
        Self {
            params,
            client,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Wait until the controllers endpoint answers with something other
    /// than 424 or a connection failure.
    async fn check_health(&self) -> Result<(), CoreError> {
        let ssid = self.client.ssid().to_owned();
        let client = &self.client;
        let raw = retry_while_unavailable(
            &self.retry,
            |err| {
                if err.is_unavailable() {
                    format!("We failed to pull storage-system information. Array Id [{ssid}] Message [{err}].")
                } else {
                    format!(
                        "Connection failure: we failed to modify the network settings! Array Id [{ssid}]. Error [{err}]."
                    )
                }
            },
            move || async move {
                let raw = client.probe_controllers().await?;
                if raw.status == 424 {
                    return Err(storctl_api::Error::Http {
                        status: 424,
                        body: raw.body.to_string(),
                    });
                }
                Ok::<_, storctl_api::Error>(raw)
            },
        )
        .await?;

        if raw.status >= 300 {
            return Err(CoreError::Rejected {
                message: format!(
                    "We failed to pull storage-system information. Array Id [{}] Message [{}].",
                    self.client.ssid(),
                    raw.body
                ),
            });
        }
        Ok(())
    }

    pub async fn apply(&self, check_mode: bool) -> Result<MgmtInterfaceOutcome, CoreError> {
        let ssid = self.client.ssid().to_owned();
        let Some(selector) = self.params.port() else {
            return Err(CoreError::validation(
                "one of the following is required: name, channel",
            ));
        };

        self.check_health().await?;

        let controllers = self.client.list_controllers().await.map_err(CoreError::remote(
            format!("Failed to retrieve the controller settings. Array Id [{ssid}]"),
        ))?;
        let controller = select_controller(controllers, self.params.controller).ok_or_else(|| {
            CoreError::NotFound {
                entity_type: "controller".into(),
                message: format!(
                    "Controller [{}] does not exist on Array=[{ssid}].",
                    self.params.controller
                ),
            }
        })?;

        let interfaces = self.client.list_ethernet_interfaces().await.map_err(
            CoreError::remote(format!(
                "Failed to retrieve defined management interfaces. Array Id [{ssid}]"
            )),
        )?;
        let iface = find_interface(&interfaces, &controller.controller_ref, &selector)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "interface".into(),
                message: format!(
                    "We could not find an interface matching [{selector}] on Array=[{ssid}]."
                ),
            })?;
        debug!(
            controller = %self.params.controller,
            interface = %iface.interface_ref,
            "matched management interface"
        );

        let (changed, body) = build_update(&self.params, &controller, iface);
        let enabled = body.ipv4_enabled.unwrap_or(iface.ipv4_enabled);
        debug!(changed, ?body, "interface update");

        if changed && !check_mode {
            info!(interface = %iface.interface_ref, "updating management interface");
            let raw = self
                .client
                .update_ethernet_interface(&body)
                .await
                .map_err(|err| match err {
                    storctl_api::Error::Authentication { .. } => CoreError::from(err),
                    other => CoreError::remote(format!(
                        "Connection failure: we failed to modify the network settings! Array Id [{ssid}]"
                    ))(other),
                })?;
            Self::check_update_response(&ssid, &raw, enabled, iface.ipv6_enabled)?;
        }

        Ok(MgmtInterfaceOutcome {
            changed,
            msg: UPDATED_MESSAGE.into(),
            enabled,
        })
    }

    fn check_update_response(
        ssid: &str,
        raw: &RawResponse,
        ipv4_enabled: bool,
        ipv6_enabled: bool,
    ) -> Result<(), CoreError> {
        if raw.status == 422 && is_illegal_param(&raw.body) && !(ipv4_enabled || ipv6_enabled) {
            let detail = raw.body["errorMessage"]
                .as_str()
                .map_or_else(|| raw.body.to_string(), String::from);
            return Err(CoreError::Rejected {
                message: format!(
                    "This storage-system already has IPv6 connectivity disabled. DHCP configuration \
                     for IPv4 is required at a minimum. Array Id [{ssid}] Message [{detail}]."
                ),
            });
        }
        if raw.status >= 300 {
            return Err(CoreError::Rejected {
                message: format!(
                    "We failed to configure the management interface. Array Id [{ssid}] Message [{}].",
                    raw.body
                ),
            });
        }
        Ok(())
    }
}
