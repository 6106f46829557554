//! `storctl cifs-server`: na_ontap_cifs_server from flags.

use serde_json::Map;

use storctl_core::ModuleKind;

use crate::cli::{CifsServerArgs, GlobalOpts};
use crate::error::CliError;

use super::util::{execute, put, value_name};

pub async fn handle(args: CifsServerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut params = Map::new();
    let conn = args.connection;
    put(&mut params, "hostname", conn.hostname);
    put(&mut params, "username", conn.username);
    put(&mut params, "password", conn.password);
    put(&mut params, "https", conn.https.then_some(true));
    put(&mut params, "http_port", conn.http_port);

    put(&mut params, "cifs_server_name", Some(args.cifs_server_name));
    put(&mut params, "vserver", args.vserver);
    put(&mut params, "state", value_name(&args.state));
    put(
        &mut params,
        "service_state",
        args.service_state.as_ref().and_then(value_name),
    );
    put(&mut params, "workgroup", args.workgroup);
    put(&mut params, "domain", args.domain);
    put(&mut params, "admin_user_name", args.admin_user_name);
    put(&mut params, "admin_password", args.admin_password);

    execute(ModuleKind::CifsServer, params, global).await
}
