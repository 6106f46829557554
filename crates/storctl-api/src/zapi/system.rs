// ZAPI cluster-level helpers
//
// EMS autosupport logging. Every ONTAP module logs an EMS event before
// it reads or changes anything.

use tracing::debug;

use crate::error::Error;
use crate::zapi::client::ZapiClient;
use crate::zapi::element::NaElement;

/// Fields of an `ems-autosupport-log` event.
#[derive(Debug, Clone)]
pub struct EmsEvent {
    pub computer_name: String,
    pub event_id: String,
    pub event_source: String,
    pub app_version: String,
    pub category: String,
    pub event_description: String,
    pub log_level: String,
    pub auto_support: bool,
}

impl EmsEvent {
    /// The setup event every module sends before touching the cluster.
    pub fn setup(source: impl Into<String>) -> Self {
        Self {
            computer_name: "storctl".into(),
            event_id: "12345".into(),
            event_source: source.into(),
            app_version: env!("CARGO_PKG_VERSION").into(),
            category: "Information".into(),
            event_description: "setup".into(),
            log_level: "6".into(),
            auto_support: false,
        }
    }

    pub(crate) fn to_element(&self) -> NaElement {
        NaElement::with_children(
            "ems-autosupport-log",
            [
                ("computer-name", self.computer_name.as_str()),
                ("event-id", self.event_id.as_str()),
                ("event-source", self.event_source.as_str()),
                ("app-version", self.app_version.as_str()),
                ("category", self.category.as_str()),
                ("event-description", self.event_description.as_str()),
                ("log-level", self.log_level.as_str()),
                ("auto-support", if self.auto_support { "true" } else { "false" }),
            ],
        )
    }
}

impl ZapiClient {
    /// Send an EMS autosupport log event.
    ///
    /// `ems-autosupport-log`, tunnelled to the vserver when one is set.
    pub async fn ems_log_event(&self, event: &EmsEvent) -> Result<(), Error> {
        debug!(source = %event.event_source, "sending ems log event");
        self.invoke(&event.to_element(), true).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_event_reports_crate_version() {
        let el = EmsEvent::setup("na_ontap_cifs_server").to_element();
        assert_eq!(el.child_content("app-version"), Some(env!("CARGO_PKG_VERSION")));
        assert_eq!(el.child_content("event-source"), Some("na_ontap_cifs_server"));
        assert_eq!(el.child_content("auto-support"), Some("false"));
        assert_eq!(el.child_content("log-level"), Some("6"));
    }
}
