//! Command handlers, one module per subcommand.

pub mod cifs_server;
pub mod config_cmd;
pub mod group_membership;
pub mod mgmt_interface;
pub mod modules;
pub mod run;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a module subcommand.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::CifsServer(args) => cifs_server::handle(args, global).await,
        Command::MgmtInterface(args) => mgmt_interface::handle(args, global).await,
        Command::GroupMembership(args) => group_membership::handle(args, global).await,
        Command::Modules => modules::handle(global),
        Command::Config(args) => config_cmd::handle(args, global),
        // Handled in main before dispatch
        Command::Run(_) | Command::Completions(_) => Ok(()),
    }
}
