//! `storctl mgmt-interface`: netapp_e_mgmt_interface from flags.

use serde_json::Map;

use storctl_core::ModuleKind;

use crate::cli::{GlobalOpts, MgmtInterfaceArgs};
use crate::error::CliError;

use super::util::{execute, put, value_name};

pub async fn handle(args: MgmtInterfaceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut params = Map::new();
    put(&mut params, "api_url", args.api_url);
    put(&mut params, "api_username", args.api_username);
    put(&mut params, "api_password", args.api_password);
    put(&mut params, "ssid", args.ssid);

    // Controller letters are upper case on the module side.
    put(
        &mut params,
        "controller",
        value_name(&args.controller).map(|c| c.to_uppercase()),
    );
    put(&mut params, "name", args.name);
    put(&mut params, "channel", args.channel);
    put(&mut params, "state", args.state.as_ref().and_then(value_name));
    put(
        &mut params,
        "config_method",
        args.config_method.as_ref().and_then(value_name),
    );
    put(&mut params, "address", args.address);
    put(&mut params, "subnet_mask", args.subnet_mask);
    put(&mut params, "gateway", args.gateway);
    put(
        &mut params,
        "dns_config_method",
        args.dns_config_method.as_ref().and_then(value_name),
    );
    put(&mut params, "dns_address", args.dns_address);
    put(&mut params, "dns_address_backup", args.dns_address_backup);
    put(
        &mut params,
        "ntp_config_method",
        args.ntp_config_method.as_ref().and_then(value_name),
    );
    put(&mut params, "ntp_address", args.ntp_address);
    put(&mut params, "ntp_address_backup", args.ntp_address_backup);
    put(&mut params, "ssh", args.ssh);

    execute(ModuleKind::MgmtInterface, params, global).await
}
