//! Shared helpers for command handlers.

use clap::ValueEnum;
use serde_json::{Map, Value};

use storctl_core::modules::NetLocalGroup;
use storctl_core::{ModuleInvocation, ModuleKind, ModuleRunner};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

/// Insert `key` when a value was given on the command line.
pub fn put(args: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        args.insert(key.to_owned(), value.into());
    }
}

/// Module-parameter spelling of a `ValueEnum` variant.
pub fn value_name<E: ValueEnum>(value: &E) -> Option<String> {
    value
        .to_possible_value()
        .map(|v| v.get_name().replace('-', "_"))
}

/// Run `kind` with flag-derived arguments layered over the active profile.
pub async fn execute(
    kind: ModuleKind,
    explicit: Map<String, Value>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ctx = config::resolve_profile(global, kind)?;

    let mut args = ctx.args;
    args.extend(explicit);
    if global.insecure && kind != ModuleKind::GroupMembership {
        args.insert("validate_certs".into(), Value::Bool(false));
    }

    let invocation = ModuleInvocation::new(args, global.check);
    let runner = ModuleRunner::new(NetLocalGroup)
        .with_ca_cert(ctx.ca_cert)
        .with_timeout(ctx.timeout);

    tracing::debug!(module = kind.name(), check = global.check, "dispatching module");
    let result = runner.run(kind, &invocation).await?;

    let out = output::render_result(&global.output, &result, output::should_color(&global.color))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
