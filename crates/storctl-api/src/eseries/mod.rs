// NetApp E-Series: SANtricity Web Services REST API.

pub mod client;
pub mod models;

pub use client::{EseriesClient, RawResponse, UPDATE_TIMEOUT};
pub use models::{
    ControllerInfo, DnsAcquisition, DnsServer, EthernetInterface, InterfaceUpdate,
    NtpAcquisition, NtpServer,
};
