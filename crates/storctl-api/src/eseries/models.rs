// SANtricity REST wire types
//
// Only the fields the management-interface workflow reads or writes are
// modelled; everything else in the (large) responses is ignored.

use serde::{Deserialize, Serialize};

// ── Controllers ─────────────────────────────────────────────────────

/// Entry of `GET storage-systems/{ssid}/controllers`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerInfo {
    pub controller_ref: String,
    pub physical_location: PhysicalLocation,
    #[serde(default)]
    pub network_settings: NetworkSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysicalLocation {
    pub slot: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    /// Remote shell (ssh) access for debugging.
    #[serde(default)]
    pub remote_access_enabled: bool,
}

// ── Ethernet interfaces ─────────────────────────────────────────────

/// Entry of `GET storage-systems/{ssid}/configuration/ethernet-interfaces`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthernetInterface {
    pub interface_ref: String,
    pub controller_ref: String,
    #[serde(default)]
    pub controller_slot: u32,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub interface_name: String,
    pub channel: u32,
    #[serde(default)]
    pub ipv4_enabled: bool,
    #[serde(default)]
    pub ipv6_enabled: bool,
    /// `configDhcp` or `configStatic`.
    #[serde(default)]
    pub ipv4_address_config_method: String,
    #[serde(default)]
    pub ipv4_address: Option<String>,
    #[serde(default)]
    pub ipv4_subnet_mask: Option<String>,
    #[serde(default)]
    pub ipv4_gateway_address: Option<String>,
    #[serde(default)]
    pub dns_properties: DnsProperties,
    #[serde(default)]
    pub ntp_properties: NtpProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsProperties {
    #[serde(default)]
    pub acquisition_properties: DnsAcquisition,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtpProperties {
    #[serde(default)]
    pub acquisition_properties: NtpAcquisition,
}

/// DNS acquisition settings; same shape on read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsAcquisition {
    /// `dhcp` or `stat`.
    #[serde(default)]
    pub dns_acquisition_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_servers: Vec<DnsServer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsServer {
    pub address_type: String,
    #[serde(default)]
    pub ipv4_address: Option<String>,
}

impl DnsServer {
    pub fn ipv4(address: impl Into<String>) -> Self {
        Self {
            address_type: "ipv4".into(),
            ipv4_address: Some(address.into()),
        }
    }
}

/// NTP acquisition settings; same shape on read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtpAcquisition {
    /// `disabled`, `dhcp` or `stat`.
    #[serde(default)]
    pub ntp_acquisition_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ntp_servers: Vec<NtpServer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtpServer {
    pub addr_type: String,
    #[serde(default)]
    pub ipvx_address: Option<IpvxAddress>,
}

impl NtpServer {
    pub fn ipv4(address: impl Into<String>) -> Self {
        Self {
            addr_type: "ipvx".into(),
            ipvx_address: Some(IpvxAddress {
                address_type: "ipv4".into(),
                ipv4_address: Some(address.into()),
            }),
        }
    }

    pub fn ipv4_address(&self) -> Option<&str> {
        self.ipvx_address.as_ref()?.ipv4_address.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpvxAddress {
    pub address_type: String,
    #[serde(default)]
    pub ipv4_address: Option<String>,
}

// ── Update request ──────────────────────────────────────────────────

/// Body of `POST storage-systems/{ssid}/configuration/ethernet-interfaces`.
///
/// Unset fields are omitted so the array keeps its current values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceUpdate {
    pub controller_ref: String,
    pub interface_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_address_config_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_subnet_mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_gateway_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_acquisition_descriptor: Option<DnsAcquisition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntp_acquisition_descriptor: Option<NtpAcquisition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_remote_access: Option<bool>,
}
