//! `storctl modules`: list modules and their parameters.

use serde::Serialize;
use strum::IntoEnumIterator;

use storctl_core::ModuleKind;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ModuleInfo {
    name: &'static str,
    parameters: Vec<&'static str>,
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let modules: Vec<ModuleInfo> = ModuleKind::iter()
        .map(|kind| ModuleInfo {
            name: kind.name(),
            parameters: kind.supported_parameters(),
        })
        .collect();

    let out = output::render_single(
        &global.output,
        &modules,
        |modules| {
            modules
                .iter()
                .map(|m| format!("{}\n  {}", m.name, m.parameters.join(", ")))
                .collect::<Vec<_>>()
                .join("\n\n")
        },
        |modules| {
            modules
                .iter()
                .map(|m| m.name)
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
