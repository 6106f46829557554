//! `storctl group-membership`: win_group_membership from flags.

use serde_json::{Map, Value};

use storctl_core::ModuleKind;

use crate::cli::{GlobalOpts, GroupMembershipArgs};
use crate::error::CliError;

use super::util::{execute, put, value_name};

pub async fn handle(args: GroupMembershipArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut params = Map::new();
    put(&mut params, "name", Some(args.name));
    put(&mut params, "members", Some(Value::from(args.members)));
    put(&mut params, "state", value_name(&args.state));

    execute(ModuleKind::GroupMembership, params, global).await
}
