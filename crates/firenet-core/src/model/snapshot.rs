// ── Stove snapshot ──

use serde::Serialize;
use serde_json::Value;

use super::attribute::{Attribute, AttributeValue, HeaterCoolerState, TargetHeaterCoolerState};

/// Semantic view of one Firenet status fetch.
///
/// Built wholesale by [`crate::convert::snapshot_from_status`] and never
/// mutated afterwards; a newer fetch replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoveSnapshot {
    /// Stove name from the Firenet account, if reported.
    pub name: Option<String>,
    pub active: bool,
    pub current_state: HeaterCoolerState,
    pub target_state: TargetHeaterCoolerState,
    pub current_temperature: f64,
    pub target_temperature: f64,
    /// Raw `statusMainState` / `statusSubState` pair the states derive from.
    pub main_state: i64,
    pub sub_state: i64,
    /// Opaque control-set revision; echoed back on writes.
    pub revision: Value,
}

impl StoveSnapshot {
    /// Read one attribute out of the snapshot.
    pub fn attribute(&self, attribute: Attribute) -> AttributeValue {
        match attribute {
            Attribute::Active => AttributeValue::Bool(self.active),
            Attribute::CurrentHeaterCoolerState => AttributeValue::State(self.current_state),
            Attribute::TargetHeaterCoolerState => AttributeValue::Target(self.target_state),
            Attribute::CurrentTemperature => AttributeValue::Number(self.current_temperature),
            Attribute::HeatingThresholdTemperature => {
                AttributeValue::Number(self.target_temperature)
            }
        }
    }
}
