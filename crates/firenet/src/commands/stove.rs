//! `status`, `get` and `set`.

use tracing::debug;

use firenet_core::{Attribute, AttributeValue, Stove, TargetHeaterCoolerState};

use crate::cli::{GetArgs, GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

pub async fn status(args: StatusArgs, stove: &Stove, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = if args.refresh {
        stove.refresh().await?
    } else {
        stove.status().await?
    };
    let color = output::should_color(&global.color);
    let out = output::render_snapshot(&global.output, stove.name(), &snapshot, color)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn get(args: GetArgs, stove: &Stove, global: &GlobalOpts) -> Result<(), CliError> {
    let value = stove.get_attribute(args.attribute).await?;
    let color = output::should_color(&global.color);
    let out = output::render_value(&global.output, args.attribute, &value, color)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn set(
    attribute: Attribute,
    value: AttributeValue,
    stove: &Stove,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    debug!(%attribute, %value, "setting attribute");
    stove.set_attribute(attribute, value).await?;

    if !global.quiet {
        eprintln!("{attribute} set to {}", output::format_value(&value, false));
    }
    Ok(())
}

/// Interpret a command-line value for `attribute`.
pub fn parse_value(attribute: Attribute, raw: &str) -> Result<AttributeValue, CliError> {
    if !attribute.is_writable() {
        return Err(CliError::ReadOnly { attribute });
    }

    let invalid = |reason: &str| CliError::Validation {
        field: attribute.to_string(),
        reason: format!("'{raw}' {reason}"),
    };

    match attribute {
        Attribute::Active => match raw.to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(AttributeValue::Bool(true)),
            "off" | "false" | "no" | "0" => Ok(AttributeValue::Bool(false)),
            _ => Err(invalid("is not on/off")),
        },
        Attribute::TargetHeaterCoolerState => {
            if raw == "0" {
                return Ok(AttributeValue::Target(TargetHeaterCoolerState::Auto));
            }
            raw.parse::<TargetHeaterCoolerState>()
                .map(AttributeValue::Target)
                .map_err(|_| invalid("is not a supported mode (only auto)"))
        }
        _ => raw
            .trim_end_matches("°C")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(AttributeValue::Number)
            .ok_or_else(|| invalid("is not a temperature")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn active_accepts_switch_words() {
        assert_eq!(
            parse_value(Attribute::Active, "ON").unwrap(),
            AttributeValue::Bool(true)
        );
        assert_eq!(
            parse_value(Attribute::Active, "0").unwrap(),
            AttributeValue::Bool(false)
        );
        assert!(matches!(
            parse_value(Attribute::Active, "maybe"),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn temperatures_parse_as_numbers() {
        assert_eq!(
            parse_value(Attribute::HeatingThresholdTemperature, "21.5").unwrap(),
            AttributeValue::Number(21.5)
        );
        assert_eq!(
            parse_value(Attribute::HeatingThresholdTemperature, "22°C").unwrap(),
            AttributeValue::Number(22.0)
        );
        assert!(parse_value(Attribute::HeatingThresholdTemperature, "NaN").is_err());
    }

    #[test]
    fn target_state_only_knows_auto() {
        assert_eq!(
            parse_value(Attribute::TargetHeaterCoolerState, "auto").unwrap(),
            AttributeValue::Target(TargetHeaterCoolerState::Auto)
        );
        assert!(parse_value(Attribute::TargetHeaterCoolerState, "cool").is_err());
    }

    #[test]
    fn measured_attributes_are_read_only() {
        assert!(matches!(
            parse_value(Attribute::CurrentTemperature, "20"),
            Err(CliError::ReadOnly { .. })
        ));
    }
}
