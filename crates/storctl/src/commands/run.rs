//! `storctl run`: the module invocation contract.
//!
//! Reads a JSON argument document, runs the named module and always
//! answers with a JSON result document: the module's result on success,
//! `{"changed": false, "failed": true, "msg": ...}` with exit code 1 on
//! any failure.

use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use storctl_core::modules::NetLocalGroup;
use storctl_core::{CoreError, ModuleInvocation, ModuleKind, ModuleRunner, failure_document};

use crate::cli::{GlobalOpts, RunArgs};
use crate::config;
use crate::error::exit_code;
use crate::output;

/// A parsed `run` request, or the reason it could not be parsed.
pub type Loaded = Result<(ModuleKind, ModuleInvocation), CoreError>;

/// Resolve the module and read its argument document.
///
/// `--check` forces check mode on top of `_ansible_check_mode`.
pub fn load(args: &RunArgs, global: &GlobalOpts) -> Loaded {
    let kind = ModuleKind::from_name(&args.module)?;
    let document = read_document(args.args.as_deref()).map_err(|e| {
        CoreError::validation(format!("failed to read argument document: {e}"))
    })?;
    let invocation = ModuleInvocation::from_json_str(&document)?;
    let check_mode = invocation.check_mode() || global.check;
    Ok((kind, invocation.with_check_mode(check_mode)))
}

fn read_document(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut document = String::new();
            io::stdin().read_to_string(&mut document)?;
            Ok(document)
        }
    }
}

/// Run a loaded request and print its result document; returns the exit code.
pub async fn handle(loaded: Loaded, global: &GlobalOpts) -> i32 {
    let result = match loaded {
        Ok((kind, invocation)) => execute(kind, invocation, global).await,
        Err(err) => Err(err),
    };

    let (document, code) = match result {
        Ok(document) => (document, 0),
        Err(err) => {
            tracing::debug!(error = %err, "module failed");
            (failure_document(&err), exit_code::GENERAL)
        }
    };

    match output::render_result(&global.output, &document, false) {
        Ok(out) => output::print_output(&out, false),
        Err(err) => {
            eprintln!("{err}");
            return exit_code::GENERAL;
        }
    }
    code
}

/// Profile values only apply when `--profile` names one explicitly; the
/// argument document is otherwise taken as complete.
async fn execute(
    kind: ModuleKind,
    invocation: ModuleInvocation,
    global: &GlobalOpts,
) -> Result<Value, CoreError> {
    let mut runner = ModuleRunner::new(NetLocalGroup);
    let mut invocation = invocation;

    if global.profile.is_some() {
        let ctx = config::resolve_profile(global, kind).map_err(|e| CoreError::Config {
            message: e.to_string(),
        })?;
        let mut args = ctx.args;
        args.extend(invocation.args().clone());
        invocation = ModuleInvocation::new(args, invocation.check_mode());
        runner = runner.with_ca_cert(ctx.ca_cert).with_timeout(ctx.timeout);
    } else if let Some(secs) = global.timeout {
        runner = runner.with_timeout(Some(Duration::from_secs(secs)));
    }

    runner.run(kind, &invocation).await
}
