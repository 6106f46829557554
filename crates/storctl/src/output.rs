//! Output formatting: table, JSON, YAML, plain.
//!
//! Module results are JSON documents; `--output` picks how they are
//! shown. Table renders the top-level keys as rows, plain prints a
//! single status word for scripts.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// the `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json_pretty(data)?,
        OutputFormat::JsonCompact => render_json_compact(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Render a module result document.
pub fn render_result(
    format: &OutputFormat,
    result: &Value,
    color: bool,
) -> Result<String, CliError> {
    render_single(format, result, |r| render_result_table(r, color), plain_status)
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn render_result_table(result: &Value, color: bool) -> String {
    let Some(fields) = result.as_object() else {
        return scalar(result);
    };
    let rows: Vec<FieldRow> = fields
        .iter()
        .map(|(field, value)| {
            let mut value = scalar(value);
            if color && field == "changed" {
                value = if value == "true" {
                    value.yellow().to_string()
                } else {
                    value.green().to_string()
                };
            }
            if color && field == "failed" && value == "true" {
                value = value.red().to_string();
            }
            FieldRow {
                field: field.clone(),
                value,
            }
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// `failed`, `changed` or `ok`.
fn plain_status(result: &Value) -> String {
    if result["failed"].as_bool() == Some(true) {
        "failed".into()
    } else if result["changed"].as_bool() == Some(true) {
        "changed".into()
    } else {
        "ok".into()
    }
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string(data)?)
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Validation {
        field: "output".into(),
        reason: format!("failed to encode YAML: {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_reports_status_word() {
        let out = render_result(&OutputFormat::Plain, &json!({ "changed": true }), false).unwrap();
        assert_eq!(out, "changed");
        let out = render_result(
            &OutputFormat::Plain,
            &json!({ "changed": false, "failed": true, "msg": "x" }),
            false,
        )
        .unwrap();
        assert_eq!(out, "failed");
    }

    #[test]
    fn table_lists_fields() {
        let out = render_result(
            &OutputFormat::Table,
            &json!({ "changed": false, "members": ["CORP\\a", "CORP\\b"] }),
            false,
        )
        .unwrap();
        assert!(out.contains("changed"));
        assert!(out.contains("CORP\\a, CORP\\b"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let out =
            render_result(&OutputFormat::JsonCompact, &json!({ "changed": true }), false).unwrap();
        assert_eq!(out, r#"{"changed":true}"#);
    }
}
