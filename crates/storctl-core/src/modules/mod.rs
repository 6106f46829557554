// ── Modules ──
//
// Each module parses its parameters, reads the remote state once,
// computes a diff and applies at most one corrective change.

pub mod cifs_server;
pub mod group_membership;
pub mod mgmt_interface;

pub use cifs_server::{CifsServerOutcome, CifsServerParams, CifsServerTask};
pub use group_membership::{
    GroupMembershipOutcome, GroupMembershipParams, GroupMembershipTask, LocalGroups, MemberName,
    NetLocalGroup,
};
pub use mgmt_interface::{MgmtInterfaceOutcome, MgmtInterfaceParams, MgmtInterfaceTask};
