// Firenet wire models
//
// The status payload is kept loosely typed: the stove firmware adds and
// renames fields between releases, and writes must echo the whole
// `controls` object back untouched apart from the one field being set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `controls` object: writable stove settings plus the `revision` token.
pub type Controls = Map<String, Value>;

/// The `sensors` object: read-only measurements and status codes.
pub type Sensors = Map<String, Value>;

/// Body of `GET /api/client/{stove}/status`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoveStatus {
    /// Display name configured in the Firenet account.
    #[serde(default)]
    pub name: Option<String>,
    pub controls: Controls,
    pub sensors: Sensors,
    /// Everything else (`stoveID`, `lastSeenMinutes`, `oem`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoveStatus {
    /// The opaque revision token of the control set, if present.
    pub fn revision(&self) -> Option<&Value> {
        self.controls.get("revision")
    }
}

/// Flatten a controls object into form fields the way a browser form
/// would submit them.
///
/// Scalars are rendered as text, `null` as an empty value. Nested arrays
/// and objects have no form representation and are sent as JSON text.
pub fn controls_form(controls: &Controls) -> Vec<(String, String)> {
    controls
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                Value::Array(_) | Value::Object(_) => value.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn status_keeps_unknown_fields() {
        let status: StoveStatus = serde_json::from_value(json!({
            "name": "Living room",
            "stoveID": "12345",
            "lastSeenMinutes": 0,
            "controls": { "revision": 1_700_000_000, "onOff": true },
            "sensors": { "statusMainState": 3 }
        }))
        .unwrap();

        assert_eq!(status.name.as_deref(), Some("Living room"));
        assert_eq!(status.extra.get("stoveID"), Some(&json!("12345")));
        assert_eq!(status.revision(), Some(&json!(1_700_000_000)));
    }

    #[test]
    fn status_requires_controls_and_sensors() {
        let result = serde_json::from_value::<StoveStatus>(json!({ "controls": {} }));
        assert!(result.is_err());
    }

    #[test]
    fn form_renders_scalars_as_text() {
        let controls: Controls = serde_json::from_value(json!({
            "onOff": false,
            "targetTemperature": "21",
            "heatingPower": 65,
            "revision": 1_700_000_001,
            "frostProtectionActive": null,
        }))
        .unwrap();

        let mut form = controls_form(&controls);
        form.sort();
        assert_eq!(
            form,
            vec![
                ("frostProtectionActive".into(), String::new()),
                ("heatingPower".into(), "65".into()),
                ("onOff".into(), "false".into()),
                ("revision".into(), "1700000001".into()),
                ("targetTemperature".into(), "21".into()),
            ]
        );
    }
}
