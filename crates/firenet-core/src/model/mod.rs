// ── Domain model ──
//
// Semantic heater/cooler attributes and the stove snapshot they are
// read from. Raw Firenet payloads never leave `convert.rs`.

pub mod attribute;
pub mod snapshot;

pub use attribute::{
    Attribute, AttributeValue, ControlChange, HeaterCoolerState, TargetHeaterCoolerState,
};
pub use snapshot::StoveSnapshot;
