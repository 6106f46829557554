// ── Module dispatch ──
//
// Routes an invocation to the module named by `ModuleKind`, runs it and
// returns the JSON result document.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

use crate::error::CoreError;
use crate::invocation::ModuleInvocation;
use crate::modules::{
    CifsServerParams, CifsServerTask, GroupMembershipParams, GroupMembershipTask, LocalGroups,
    MgmtInterfaceParams, MgmtInterfaceTask, NetLocalGroup,
};
use crate::retry::RetryPolicy;

/// Modules this crate implements, by their invocation name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum ModuleKind {
    #[strum(serialize = "na_ontap_cifs_server")]
    CifsServer,
    #[strum(serialize = "netapp_e_mgmt_interface")]
    MgmtInterface,
    #[strum(serialize = "win_group_membership")]
    GroupMembership,
}

impl ModuleKind {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        name.parse()
            .map_err(|_| CoreError::validation(format!("unknown module: {name}")))
    }

    pub fn supported_parameters(self) -> Vec<&'static str> {
        match self {
            Self::CifsServer => CifsServerParams::supported_parameters(),
            Self::MgmtInterface => MgmtInterfaceParams::supported_parameters(),
            Self::GroupMembership => GroupMembershipParams::supported_parameters(),
        }
    }
}

/// Runs modules with shared connection settings.
pub struct ModuleRunner<G = NetLocalGroup> {
    groups: G,
    retry: RetryPolicy,
    ca_cert: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Default for ModuleRunner<NetLocalGroup> {
    fn default() -> Self {
        Self::new(NetLocalGroup)
    }
}

impl<G: LocalGroups> ModuleRunner<G> {
    pub fn new(groups: G) -> Self {
        Self {
            groups,
            retry: RetryPolicy::default(),
            ca_cert: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// CA bundle used when `validate_certs` is on.
    #[must_use]
    pub fn with_ca_cert(mut self, ca_cert: Option<PathBuf>) -> Self {
        self.ca_cert = ca_cert;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(
        &self,
        kind: ModuleKind,
        invocation: &ModuleInvocation,
    ) -> Result<Value, CoreError> {
        let check_mode = invocation.check_mode();
        debug!(module = kind.name(), check_mode, "running module");

        match kind {
            ModuleKind::CifsServer => {
                let mut params = CifsServerParams::from_invocation(invocation)?;
                params.host.ca_cert.clone_from(&self.ca_cert);
                params.host.timeout = self.timeout;
                let outcome = CifsServerTask::new(params)?.apply(check_mode).await?;
                to_document(&outcome)
            }
            ModuleKind::MgmtInterface => {
                let mut params = MgmtInterfaceParams::from_invocation(invocation)?;
                params.host.ca_cert.clone_from(&self.ca_cert);
                params.host.timeout = self.timeout;
                let outcome = MgmtInterfaceTask::new(params)?
                    .with_retry_policy(self.retry)
                    .apply(check_mode)
                    .await?;
                to_document(&outcome)
            }
            ModuleKind::GroupMembership => {
                let params = GroupMembershipParams::from_invocation(invocation)?;
                let outcome = GroupMembershipTask::new(params, &self.groups)
                    .apply(check_mode)
                    .await?;
                to_document(&outcome)
            }
        }
    }
}

fn to_document(outcome: &impl Serialize) -> Result<Value, CoreError> {
    serde_json::to_value(outcome)
        .map_err(|e| CoreError::Internal(format!("failed to encode result: {e}")))
}
