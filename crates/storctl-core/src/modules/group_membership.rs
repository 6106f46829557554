// ── win_group_membership ──
//
// Adds or removes members of a local group. Membership is read and
// changed through a `LocalGroups` backend; the production backend shells
// out to `net localgroup`.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::invocation::{ModuleInvocation, de};

pub const MODULE_NAME: &str = "win_group_membership";

const MODULE_PARAMETERS: &[&str] = &["name", "members", "state"];

// ── Parameters ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipState {
    #[default]
    Present,
    Absent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupMembershipParams {
    #[serde(deserialize_with = "de::string")]
    pub name: String,

    #[serde(deserialize_with = "de::string_list")]
    pub members: Vec<String>,

    #[serde(default)]
    pub state: MembershipState,
}

impl GroupMembershipParams {
    pub fn supported_parameters() -> Vec<&'static str> {
        MODULE_PARAMETERS.to_vec()
    }

    pub fn from_invocation(invocation: &ModuleInvocation) -> Result<Self, CoreError> {
        let params: Self = invocation.parse(MODULE_NAME, MODULE_PARAMETERS)?;
        if params.members.is_empty() {
            return Err(CoreError::validation("members must not be empty"));
        }
        Ok(params)
    }
}

// ── Member identity ─────────────────────────────────────────────────

/// A principal name split into scope (domain or machine) and account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberName {
    pub scope: Option<String>,
    pub account: String,
}

impl MemberName {
    /// Normalise the accepted spellings:
    /// `.\user` (this machine), `SCOPE\user`, `user@DOMAIN` and bare `user`.
    pub fn parse(raw: &str, computer_name: &str) -> Self {
        let raw = raw.trim();
        if let Some((scope, account)) = raw.split_once('\\') {
            let scope = if scope == "." { computer_name } else { scope };
            return Self {
                scope: Some(scope.to_owned()),
                account: account.to_owned(),
            };
        }
        if let Some((account, domain)) = raw.split_once('@') {
            return Self {
                scope: Some(domain.to_owned()),
                account: account.to_owned(),
            };
        }
        Self {
            scope: None,
            account: raw.to_owned(),
        }
    }

    /// A member as the host lists it: `net localgroup` prints local
    /// accounts without a scope, so those belong to this machine.
    pub fn observed(raw: &str, computer_name: &str) -> Self {
        let mut name = Self::parse(raw, computer_name);
        if name.scope.is_none() {
            name.scope = Some(computer_name.to_owned());
        }
        name
    }

    /// Case-insensitive; an unscoped name matches any scope.
    pub fn matches(&self, other: &Self) -> bool {
        if !self.account.eq_ignore_ascii_case(&other.account) {
            return false;
        }
        match (&self.scope, &other.scope) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => true,
        }
    }
}

impl std::fmt::Display for MemberName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{scope}\\{}", self.account),
            None => f.write_str(&self.account),
        }
    }
}

// ── Backend ─────────────────────────────────────────────────────────

/// Access to the host's local groups.
pub trait LocalGroups {
    /// Current members, as the host spells them.
    ///
    /// Fails with `CoreError::NotFound` when the group does not exist.
    fn members(&self, group: &str) -> impl Future<Output = Result<Vec<String>, CoreError>> + Send;

    fn add_member(
        &self,
        group: &str,
        member: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn remove_member(
        &self,
        group: &str,
        member: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl<T: LocalGroups> LocalGroups for &T {
    fn members(&self, group: &str) -> impl Future<Output = Result<Vec<String>, CoreError>> + Send {
        (**self).members(group)
    }

    fn add_member(
        &self,
        group: &str,
        member: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        (**self).add_member(group, member)
    }

    fn remove_member(
        &self,
        group: &str,
        member: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        (**self).remove_member(group, member)
    }
}

fn group_not_found(group: &str) -> CoreError {
    CoreError::NotFound {
        entity_type: "group".into(),
        message: format!("Could not find local group {group}"),
    }
}

/// `net localgroup`, available on every Windows host.
#[derive(Debug, Clone, Default)]
pub struct NetLocalGroup;

/// Member lines of `net localgroup <name>`: everything between the
/// dashed rule and the completion notice.
pub fn parse_net_localgroup(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("---"))
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take_while(|line| !line.starts_with("The command completed"))
        .map(String::from)
        .collect()
}

impl NetLocalGroup {
    async fn net(&self, group: &str, args: &[&str]) -> Result<String, CoreError> {
        debug!(group, ?args, "running net localgroup");
        let output = tokio::process::Command::new("net")
            .arg("localgroup")
            .arg(group)
            .args(args)
            .output()
            .await
            .map_err(|e| CoreError::Internal(format!("failed to run net localgroup: {e}")))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        // NERR_GroupNotFound
        if stderr.contains("1376") {
            return Err(group_not_found(group));
        }
        Err(CoreError::Rejected {
            message: format!("net localgroup {group} failed: {}", stderr.trim()),
        })
    }
}

impl LocalGroups for NetLocalGroup {
    async fn members(&self, group: &str) -> Result<Vec<String>, CoreError> {
        let stdout = self.net(group, &[]).await?;
        Ok(parse_net_localgroup(&stdout))
    }

    async fn add_member(&self, group: &str, member: &str) -> Result<(), CoreError> {
        self.net(group, &[member, "/add"]).await.map(drop)
    }

    async fn remove_member(&self, group: &str, member: &str) -> Result<(), CoreError> {
        self.net(group, &[member, "/delete"]).await.map(drop)
    }
}

/// Name of this machine, used to expand `.\user`.
pub fn local_computer_name() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| "localhost".into())
}

// ── Execution ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMembershipOutcome {
    pub changed: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<Vec<String>>,
    pub members: Vec<String>,
}

pub struct GroupMembershipTask<G> {
    params: GroupMembershipParams,
    backend: G,
    computer_name: String,
}

impl<G: LocalGroups> GroupMembershipTask<G> {
    pub fn new(params: GroupMembershipParams, backend: G) -> Self {
        Self {
            params,
            backend,
            computer_name: local_computer_name(),
        }
    }

    #[must_use]
    pub fn with_computer_name(mut self, computer_name: impl Into<String>) -> Self {
        self.computer_name = computer_name.into();
        self
    }

    pub async fn apply(&self, check_mode: bool) -> Result<GroupMembershipOutcome, CoreError> {
        let group = &self.params.name;
        let mut members = self.backend.members(group).await?;
        debug!(group, count = members.len(), "observed group members");

        let mut changes = Vec::new();
        for raw in &self.params.members {
            let wanted = MemberName::parse(raw, &self.computer_name);
            let position = members
                .iter()
                .position(|m| MemberName::observed(m, &self.computer_name).matches(&wanted));

            match (self.params.state, position) {
                (MembershipState::Present, None) => {
                    if !check_mode {
                        info!(group, member = %wanted, "adding group member");
                        self.backend.add_member(group, &wanted.to_string()).await?;
                    }
                    members.push(wanted.to_string());
                    changes.push(wanted.to_string());
                }
                (MembershipState::Absent, Some(index)) => {
                    let current = members.remove(index);
                    if !check_mode {
                        info!(group, member = %current, "removing group member");
                        self.backend.remove_member(group, &current).await?;
                    }
                    changes.push(current);
                }
                _ => {}
            }
        }

        let changed = !changes.is_empty();
        let (added, removed) = match self.params.state {
            MembershipState::Present => (Some(changes), None),
            MembershipState::Absent => (None, Some(changes)),
        };
        Ok(GroupMembershipOutcome {
            changed,
            name: group.clone(),
            added,
            removed,
            members,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn member_spellings_normalise() {
        assert_eq!(
            MemberName::parse(".\\admin2", "SRV01").to_string(),
            "SRV01\\admin2"
        );
        assert_eq!(
            MemberName::parse("TestUser@CORP", "SRV01").to_string(),
            "CORP\\TestUser"
        );
        assert_eq!(MemberName::parse("Guest", "SRV01").scope, None);
    }

    #[test]
    fn matching_rules() {
        let host = "SRV01";
        let scoped = MemberName::parse("corp\\testuser", host);
        assert!(scoped.matches(&MemberName::parse("CORP\\TestUser", host)));
        assert!(scoped.matches(&MemberName::parse("testuser@corp", host)));
        assert!(scoped.matches(&MemberName::parse("TestUser", host)));
        assert!(!scoped.matches(&MemberName::parse("OTHER\\TestUser", host)));
        assert!(MemberName::parse(".\\Admin", host).matches(&MemberName::parse("srv01\\admin", host)));
    }

    #[test]
    fn unscoped_host_members_are_local_accounts() {
        let host = "SRV01";
        let local = MemberName::observed("Administrator", host);
        assert_eq!(local.to_string(), "SRV01\\Administrator");
        assert!(!MemberName::parse("CORP\\Administrator", host).matches(&local));
        assert!(MemberName::parse("Administrator", host).matches(&local));
        assert!(MemberName::parse(".\\administrator", host).matches(&local));
        assert_eq!(
            MemberName::observed("CORP\\bob", host),
            MemberName::parse("CORP\\bob", host)
        );
    }

    #[test]
    fn parses_net_localgroup_output() {
        let stdout = "Alias name     Administrators\r\n\
                      Comment        Administrators have complete and unrestricted access\r\n\
                      \r\n\
                      Members\r\n\
                      \r\n\
                      -------------------------------------------------------------------------------\r\n\
                      Administrator\r\n\
                      CORP\\Domain Admins\r\n\
                      The command completed successfully.\r\n";
        assert_eq!(
            parse_net_localgroup(stdout),
            vec!["Administrator", "CORP\\Domain Admins"]
        );
    }

    #[test]
    fn members_accept_comma_separated_string() {
        let invocation = ModuleInvocation::from_json_str(
            r#"{"name": "Backup Operators", "members": "CORP\\svc, NT AUTHORITY\\SYSTEM"}"#,
        )
        .unwrap();
        let params = GroupMembershipParams::from_invocation(&invocation).unwrap();
        assert_eq!(params.members, vec!["CORP\\svc", "NT AUTHORITY\\SYSTEM"]);
        assert_eq!(params.state, MembershipState::Present);
    }
}
