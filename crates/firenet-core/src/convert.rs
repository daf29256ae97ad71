// ── API-to-domain conversions ──
//
// Bridges the raw `firenet_api::StoveStatus` payload into the semantic
// `StoveSnapshot`, and attribute writes into `controls` field changes.
// Everything here is pure: the same payload always maps to the same
// snapshot, and the input is never modified.

use serde_json::{Map, Value};

use firenet_api::{Controls, StoveStatus};

use crate::error::CoreError;
use crate::model::{
    Attribute, AttributeValue, ControlChange, HeaterCoolerState, StoveSnapshot,
    TargetHeaterCoolerState,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Read a numeric field. Firenet sends some numbers as strings
/// (`"targetTemperature": "21"`), so numeric strings are accepted too.
fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn integer(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn missing(object: &str, key: &str) -> CoreError {
    CoreError::MalformedResponse {
        message: format!("missing or non-numeric {object}.{key}"),
    }
}

/// Status codes are reported under `sensors`; older firmware also
/// mirrored them into `controls`.
fn status_code(status: &StoveStatus, key: &str) -> Result<i64, CoreError> {
    integer(&status.sensors, key)
        .or_else(|| integer(&status.controls, key))
        .ok_or_else(|| missing("sensors", key))
}

// ── State mapping ──────────────────────────────────────────────────

/// The stove reports "off" as exactly `mainState == 0, subState == 1`.
pub fn is_off(main_state: i64, sub_state: i64) -> bool {
    main_state == 0 && sub_state == 1
}

/// Any pair other than the "off" pair is some active state.
pub fn is_active(main_state: i64, sub_state: i64) -> bool {
    !is_off(main_state, sub_state)
}

/// Main states 2 through 5 are the ignition and burning phases.
pub fn current_state(main_state: i64, sub_state: i64) -> HeaterCoolerState {
    if is_off(main_state, sub_state) {
        HeaterCoolerState::Inactive
    } else if (2..=5).contains(&main_state) {
        HeaterCoolerState::Heating
    } else {
        HeaterCoolerState::Idle
    }
}

// ── Status → snapshot ──────────────────────────────────────────────

/// Map a raw status payload onto the semantic snapshot.
///
/// Only presence of the fields the attributes need is checked; unknown
/// fields are ignored.
pub fn snapshot_from_status(status: &StoveStatus) -> Result<StoveSnapshot, CoreError> {
    let main_state = status_code(status, "statusMainState")?;
    let sub_state = status_code(status, "statusSubState")?;

    let current_temperature = number(&status.sensors, "inputRoomTemperature")
        .ok_or_else(|| missing("sensors", "inputRoomTemperature"))?;
    let target_temperature = number(&status.controls, "targetTemperature")
        .ok_or_else(|| missing("controls", "targetTemperature"))?;

    Ok(StoveSnapshot {
        name: status.name.clone(),
        active: is_active(main_state, sub_state),
        current_state: current_state(main_state, sub_state),
        target_state: TargetHeaterCoolerState::Auto,
        current_temperature,
        target_temperature,
        main_state,
        sub_state,
        revision: status.revision().cloned().unwrap_or(Value::Null),
    })
}

// ── Attribute write → control change ───────────────────────────────

/// Translate an attribute write into the `controls` field it affects.
///
/// Returns `Ok(None)` for writes that are accepted but have no remote
/// effect (`TargetHeaterCoolerState`). Temperatures are forwarded as
/// given; range limits are the host's concern.
pub fn control_for(
    attribute: Attribute,
    value: AttributeValue,
) -> Result<Option<ControlChange>, CoreError> {
    match attribute {
        Attribute::Active => match value {
            AttributeValue::Bool(on) => Ok(Some(ControlChange::OnOff(on))),
            // HomeKit sends Active as 0/1.
            AttributeValue::Number(n) if n == 0.0 || n == 1.0 => {
                Ok(Some(ControlChange::OnOff(n == 1.0)))
            }
            other => Err(CoreError::InvalidValue {
                attribute,
                reason: format!("expected a boolean, got {other}"),
            }),
        },
        Attribute::HeatingThresholdTemperature => match value {
            AttributeValue::Number(t) if t.is_finite() => {
                Ok(Some(ControlChange::TargetTemperature(t)))
            }
            other => Err(CoreError::InvalidValue {
                attribute,
                reason: format!("expected a finite number, got {other}"),
            }),
        },
        Attribute::TargetHeaterCoolerState => Ok(None),
        Attribute::CurrentHeaterCoolerState | Attribute::CurrentTemperature => {
            Err(CoreError::ReadOnly { attribute })
        }
    }
}

/// Overwrite the single field `change` names, leaving everything else
/// (including `revision`) untouched.
pub fn apply_change(controls: &mut Controls, change: &ControlChange) {
    controls.insert(change.field().to_owned(), change.value());
}
