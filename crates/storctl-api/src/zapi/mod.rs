// ONTAP ZAPI: XML-over-HTTP API of clustered Data ONTAP.

pub mod cifs;
pub mod client;
pub mod element;
pub mod system;

pub use cifs::{CifsServerCreate, CifsServerInfo};
pub use client::{ZAPI_SERVLET_PATH, ZapiClient, zapi_url};
pub use element::NaElement;
pub use system::EmsEvent;
