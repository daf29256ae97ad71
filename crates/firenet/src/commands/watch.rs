//! `watch`: poll every attribute like an automation host would.
//!
//! Each tick issues one `get_attribute` per attribute concurrently; the
//! stove coalesces them into a single status fetch.

use std::time::Duration;

use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::warn;

use firenet_core::{Attribute, AttributeValue, CoreError, Stove};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs, kebab};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: WatchArgs, stove: &Stove, global: &GlobalOpts) -> Result<(), CliError> {
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let color = output::should_color(&global.color);
    let mut polls = 0_u64;

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = ticker.tick() => {}
        }

        match poll(stove).await {
            Ok(values) => {
                let line = render_line(&global.output, &values, color)?;
                output::print_output(&line, global.quiet);
            }
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => warn!(error = %e, "poll failed"),
        }

        polls += 1;
        if args.count.is_some_and(|count| polls >= count) {
            return Ok(());
        }
    }
}

async fn poll(stove: &Stove) -> Result<Vec<(Attribute, AttributeValue)>, CoreError> {
    let reads = <Attribute as strum::IntoEnumIterator>::iter().map(|attribute| async move {
        stove
            .get_attribute(attribute)
            .await
            .map(|value| (attribute, value))
    });
    join_all(reads).await.into_iter().collect()
}

fn render_line(
    format: &OutputFormat,
    values: &[(Attribute, AttributeValue)],
    color: bool,
) -> Result<String, CliError> {
    let time = chrono::Local::now();
    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            let fields: Vec<String> = values
                .iter()
                .map(|(a, v)| format!("{}={}", kebab(a.as_ref()), output::format_value(v, color)))
                .collect();
            Ok(format!("{}  {}", time.format("%H:%M:%S"), fields.join("  ")))
        }
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let mut attributes = Map::new();
            for (a, v) in values {
                attributes.insert(a.to_string(), serde_json::to_value(v)?);
            }
            let record = serde_json::json!({
                "time": time.to_rfc3339(),
                "attributes": Value::Object(attributes),
            });
            output::render_json(&record, matches!(format, OutputFormat::JsonCompact))
        }
    }
}
