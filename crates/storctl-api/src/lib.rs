//! Async clients for the two NetApp management APIs `storctl` drives.
//!
//! - **[`ZapiClient`]**: ONTAP ZAPI: XML requests wrapped in a `<netapp>`
//!   envelope, POSTed to the filer servlet with HTTP basic auth. Requests
//!   can be tunnelled to a vserver. Payloads are [`NaElement`] trees.
//!
//! - **[`EseriesClient`]**: SANtricity Web Services REST: JSON over
//!   `storage-systems/{ssid}/...`, with raw-status variants for callers
//!   that must branch on 422/424.
//!
//! Both share [`TransportConfig`] for TLS and timeouts, and fail with
//! [`Error`].

pub mod eseries;
pub mod error;
pub mod transport;
pub mod zapi;

pub use eseries::{EseriesClient, RawResponse};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use zapi::{CifsServerCreate, CifsServerInfo, EmsEvent, NaElement, ZapiClient};
