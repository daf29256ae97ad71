//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits bare values one per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use firenet_core::{Attribute, AttributeValue, HeaterCoolerState, StoveSnapshot};

use crate::cli::{ColorMode, OutputFormat, kebab};
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

/// Attribute value for humans: units on temperatures, color on state.
pub fn format_value(value: &AttributeValue, color: bool) -> String {
    let text = match value {
        AttributeValue::Bool(true) => "on".to_string(),
        AttributeValue::Bool(false) => "off".to_string(),
        AttributeValue::Number(n) => format!("{n:.1} °C"),
        other => other.to_string().to_lowercase(),
    };
    if !color {
        return text;
    }
    match value {
        AttributeValue::Bool(true) | AttributeValue::State(HeaterCoolerState::Heating) => {
            text.red().to_string()
        }
        AttributeValue::State(HeaterCoolerState::Idle) => text.yellow().to_string(),
        AttributeValue::Bool(false) | AttributeValue::State(HeaterCoolerState::Inactive) => {
            text.dimmed().to_string()
        }
        _ => text,
    }
}

// ── Rows ─────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// All attributes of a snapshot, in declaration order.
pub fn attribute_values(snapshot: &StoveSnapshot) -> Vec<(Attribute, AttributeValue)> {
    <Attribute as strum::IntoEnumIterator>::iter()
        .map(|a| (a, snapshot.attribute(a)))
        .collect()
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a full snapshot.
pub fn render_snapshot(
    format: &OutputFormat,
    name: &str,
    snapshot: &StoveSnapshot,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<AttributeRow> = attribute_values(snapshot)
                .iter()
                .map(|(a, v)| AttributeRow {
                    attribute: kebab(a.as_ref()),
                    value: format_value(v, color),
                })
                .collect();
            let title = snapshot.name.as_deref().unwrap_or(name);
            Ok(format!("{title}\n{}", render_table(&rows)))
        }
        OutputFormat::Json => render_json(snapshot, false),
        OutputFormat::JsonCompact => render_json(snapshot, true),
        OutputFormat::Plain => Ok(attribute_values(snapshot)
            .iter()
            .map(|(a, v)| format!("{}={v}", kebab(a.as_ref())))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render one attribute value.
pub fn render_value(
    format: &OutputFormat,
    attribute: Attribute,
    value: &AttributeValue,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(format_value(value, color)),
        OutputFormat::Json => render_json(
            &serde_json::json!({ "attribute": attribute, "value": value }),
            false,
        ),
        OutputFormat::JsonCompact => render_json(
            &serde_json::json!({ "attribute": attribute, "value": value }),
            true,
        ),
        OutputFormat::Plain => Ok(value.to_string()),
    }
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

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}
